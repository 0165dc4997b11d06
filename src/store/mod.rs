//! Store gateway capabilities.
//!
//! Each consumer depends on the narrowest trait it needs: the feed reads
//! through [`NotificationReader`], the republish filter looks up through
//! [`TransactionLookup`], ingest writes through [`NotificationWriter`].
//! Lookups return `Ok(None)` when nothing matches; `Err` is a store failure.

pub mod sqlite;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Notification;
use crate::feed::query::NotificationQuery;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait NotificationReader {
    async fn query(&self, query: &NotificationQuery) -> Result<Vec<Notification>>;
}

#[async_trait]
pub trait TransactionLookup {
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Notification>>;

    async fn find_by_transaction_id_prefix(&self, prefix: &str) -> Result<Option<Notification>>;
}

#[async_trait]
pub trait NotificationWriter {
    async fn write(&self, notification: &Notification) -> Result<()>;
}

#[async_trait]
pub trait StoreHealth {
    async fn ping(&self) -> Result<()>;
}

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{NotificationsError, Result};
use crate::domain::{format_timestamp, parse_timestamp, Notification};
use crate::feed::query::{NotificationQuery, WindowBounds};
use crate::store::{NotificationReader, NotificationWriter, StoreHealth, TransactionLookup};

const COLUMNS: &str = "uuid, title, event_type, publish_reference, last_modified";

/// SQLite-backed notification store.
///
/// Cloning is cheap and shares the connection. The async capability impls
/// run each statement on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| NotificationsError::Store(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NotificationsError::Store(e.to_string()))
    }

    fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
        let raw: String = row.get(4)?;
        let last_modified = parse_timestamp(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("invalid last_modified: {}", raw).into(),
            )
        })?;

        Ok(Notification {
            uuid: row.get(0)?,
            title: row.get(1)?,
            event_type: row.get(2)?,
            publish_reference: row.get(3)?,
            last_modified,
        })
    }

    pub fn insert_notification(&self, notification: &Notification) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO notifications (uuid, title, event_type, publish_reference, last_modified)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                notification.uuid,
                notification.title,
                notification.event_type,
                notification.publish_reference,
                format_timestamp(&notification.last_modified)
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Runs a feed query: window filter, newest record per uuid, stable
    /// ascending order, then skip and fetch.
    pub fn select_page(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        let (lower, upper) = match query.bounds {
            WindowBounds::Exclusive => (">", "<"),
            WindowBounds::Inclusive => (">=", "<="),
        };

        let sql = format!(
            "SELECT {columns} FROM (
                 SELECT {columns},
                        ROW_NUMBER() OVER (
                            PARTITION BY uuid ORDER BY last_modified DESC, id DESC
                        ) AS newest
                 FROM notifications
                 WHERE last_modified {lower} ?1 AND last_modified {upper} ?2
             )
             WHERE newest = 1
             ORDER BY last_modified ASC, uuid ASC
             LIMIT ?3 OFFSET ?4",
            columns = COLUMNS,
            lower = lower,
            upper = upper,
        );

        tracing::debug!(?query, "Running notifications query");

        let offset = i64::try_from(query.offset).map_err(|_| {
            NotificationsError::InvalidRequest("Please specify an integer offset.".into())
        })?;
        let fetch = i64::try_from(query.fetch)
            .map_err(|_| NotificationsError::Store(format!("page size out of range: {}", query.fetch)))?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let notifications = stmt
            .query_map(
                params![
                    format_timestamp(&query.window_start),
                    format_timestamp(&query.window_end),
                    fetch,
                    offset
                ],
                Self::row_to_notification,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    pub fn find_by_publish_reference(&self, transaction_id: &str) -> Result<Option<Notification>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM notifications WHERE publish_reference = ?1 ORDER BY id LIMIT 1",
                    COLUMNS
                ),
                params![transaction_id],
                Self::row_to_notification,
            )
            .optional()?;

        Ok(result)
    }

    /// Case-sensitive prefix match on the transaction id.
    pub fn find_by_publish_reference_prefix(&self, prefix: &str) -> Result<Option<Notification>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM notifications
                     WHERE publish_reference >= ?1
                       AND substr(publish_reference, 1, length(?1)) = ?1
                     ORDER BY id LIMIT 1",
                    COLUMNS
                ),
                params![prefix],
                Self::row_to_notification,
            )
            .optional()?;

        Ok(result)
    }

    pub fn check_connection(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl NotificationReader for SqliteStore {
    async fn query(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        let store = self.clone();
        let query = query.clone();
        tokio::task::spawn_blocking(move || store.select_page(&query)).await?
    }
}

#[async_trait]
impl TransactionLookup for SqliteStore {
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Notification>> {
        let store = self.clone();
        let transaction_id = transaction_id.to_string();
        tokio::task::spawn_blocking(move || store.find_by_publish_reference(&transaction_id)).await?
    }

    async fn find_by_transaction_id_prefix(&self, prefix: &str) -> Result<Option<Notification>> {
        let store = self.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || store.find_by_publish_reference_prefix(&prefix)).await?
    }
}

#[async_trait]
impl NotificationWriter for SqliteStore {
    async fn write(&self, notification: &Notification) -> Result<()> {
        let store = self.clone();
        let notification = notification.clone();
        tokio::task::spawn_blocking(move || store.insert_notification(&notification).map(|_| ()))
            .await?
    }
}

#[async_trait]
impl StoreHealth for SqliteStore {
    async fn ping(&self) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.check_connection()).await?
    }
}

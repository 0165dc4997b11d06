//! # list-notifications
//!
//! A change-notification feed for curated content lists.
//!
//! ## Architecture
//!
//! ```text
//! PUT /lists/{uuid} → Ingest → Store ← Feed ← GET /lists/notifications
//! ```
//!
//! Publishers record one notification per list publish. Consumers poll the
//! feed with a `since` timestamp and follow the `next` link of each page.
//! The store has no global sequence, so the feed hides the most recent
//! writes behind a cache delay and carries an offset through runs of
//! notifications that share a timestamp.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with defaults (port 8080, database under the user data directory)
//! list-notifications serve
//!
//! # Print the effective configuration
//! list-notifications show-config --limit 50
//! ```

/// Application context, error types and log control.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the feed and the ingest services.
pub mod app;

/// Command-line interface using clap.
///
/// - `serve` - Run the HTTP service (default)
/// - `show-config` - Print the effective configuration
pub mod cli;

/// Configuration loaded from `~/.config/list-notifications/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Notification`](domain::Notification): a stored publish event
/// - [`PublicNotification`](domain::PublicNotification): its public projection
/// - [`NotificationPage`](domain::NotificationPage): one page of the feed
pub mod domain;

/// The notification feed.
///
/// - [`QueryBuilder`](feed::QueryBuilder): windowed, deduplicating queries
/// - [`CursorEngine`](feed::CursorEngine): next-page cursors and links
/// - [`FeedService`](feed::FeedService): answers a feed read
pub mod feed;

/// HTTP surface built with axum.
pub mod http;

/// The write path.
///
/// - [`IngestService`](ingest::IngestService): answers a list publish
/// - [`RepublishFilter`](ingest::RepublishFilter): drops carousel republishes
pub mod ingest;

/// SQLite persistence layer.
///
/// - Capability traits: [`NotificationReader`](store::NotificationReader),
///   [`TransactionLookup`](store::TransactionLookup),
///   [`NotificationWriter`](store::NotificationWriter),
///   [`StoreHealth`](store::StoreHealth)
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

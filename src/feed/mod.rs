//! The notification feed: windowed reads with resumable cursors.

pub mod cursor;
pub mod page;
pub mod query;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::app::Result;
use crate::domain::{NotificationMapper, NotificationPage};
use crate::store::NotificationReader;

pub use cursor::{Cursor, CursorEngine, NOTIFICATIONS_PATH};
pub use page::ResultPage;
pub use query::{NotificationQuery, QueryBuilder, WindowBounds};

/// Immutable feed settings, built once at startup.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_host: String,
    pub cache_delay: Duration,
    pub limit: usize,
    pub max_since: Duration,
}

pub struct FeedService {
    reader: Arc<dyn NotificationReader + Send + Sync>,
    queries: QueryBuilder,
    cursors: CursorEngine,
    mapper: NotificationMapper,
    max_since: Duration,
}

impl FeedService {
    pub fn new(reader: Arc<dyn NotificationReader + Send + Sync>, config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            reader,
            queries: QueryBuilder::new(config.cache_delay, config.limit),
            cursors: CursorEngine::new(&config.api_host, config.cache_delay)?,
            mapper: NotificationMapper::new(config.api_host.clone()),
            max_since: config.max_since,
        })
    }

    pub async fn read(
        &self,
        since: Option<&str>,
        offset: Option<&str>,
        path_and_query: &str,
    ) -> Result<NotificationPage> {
        self.read_at(since, offset, path_and_query, Utc::now()).await
    }

    /// Reads one page as of `now`. `path_and_query` is echoed back as the
    /// page's `requestUrl`, re-hosted under the public API host.
    pub async fn read_at(
        &self,
        since: Option<&str>,
        offset: Option<&str>,
        path_and_query: &str,
        now: DateTime<Utc>,
    ) -> Result<NotificationPage> {
        let cursor = Cursor::from_params(since, offset, now, self.max_since)?;
        let query = self.queries.build(&cursor, now);

        let raw = self.reader.query(&query).await?;
        let page = ResultPage::split(raw, self.queries.limit());

        tracing::debug!(
            delivered = page.delivered.len(),
            truncated = page.is_truncated(),
            "Read notifications page"
        );

        let next = self.cursors.next_link(&cursor, &page);
        let request_url = Url::parse(&format!(
            "http://{}{}",
            self.mapper.api_host(),
            path_and_query
        ))?;

        Ok(NotificationPage {
            request_url: request_url.to_string(),
            notifications: page
                .delivered
                .iter()
                .map(|n| self.mapper.to_public(n))
                .collect(),
            links: vec![next],
        })
    }
}

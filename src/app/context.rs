use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{NotificationsError, Result};
use crate::config::Config;
use crate::domain::NotificationMapper;
use crate::feed::FeedService;
use crate::ingest::IngestService;
use crate::store::sqlite::SqliteStore;
use crate::store::StoreHealth;

pub struct AppContext {
    pub store: SqliteStore,
    pub feed: Arc<FeedService>,
    pub ingest: Arc<IngestService>,
    pub health: Arc<dyn StoreHealth + Send + Sync>,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };

        tracing::info!(path = %db_path.display(), "Opening notifications store");
        Self::with_store(SqliteStore::new(&db_path)?, config)
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        Self::with_store(SqliteStore::in_memory()?, config)
    }

    fn with_store(store: SqliteStore, config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| NotificationsError::Config(e.to_string()))?;

        let feed = FeedService::new(Arc::new(store.clone()), &config.feed_config())?;
        let ingest = IngestService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            NotificationMapper::new(config.api_host.clone()),
            config.dump_requests,
        );

        Ok(Self {
            health: Arc::new(store.clone()),
            store,
            feed: Arc::new(feed),
            ingest: Arc::new(ingest),
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NotificationsError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("list-notifications");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("notifications.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: Some(dir.path().join("notifications.db")),
            ..Config::default()
        };

        let ctx = AppContext::new(&config).unwrap();
        assert_eq!(ctx.store.count().unwrap(), 0);
        assert!(dir.path().join("notifications.db").exists());
    }

    #[test]
    fn test_out_of_range_config_rejected() {
        let config = Config {
            cache_delay_secs: i64::MAX,
            ..Config::default()
        };
        let err = AppContext::in_memory(&config).err().unwrap();
        assert!(matches!(err, NotificationsError::Config(_)));
    }

    #[test]
    fn test_invalid_api_host_rejected() {
        let config = Config {
            api_host: "bad host/".into(),
            ..Config::default()
        };
        assert!(AppContext::in_memory(&config).is_err());
    }
}

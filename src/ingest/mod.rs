//! The write path for list notifications.

pub mod carousel;
pub mod synthetic;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::NotificationMapper;
use crate::store::{NotificationWriter, TransactionLookup};

pub use carousel::{RepublishFilter, TransactionKind};
pub use synthetic::Screening;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    Synthetic,
    GeneratedCarousel,
    OriginalPublished { last_modified: DateTime<Utc> },
    EarlierCarouselPublished { last_modified: DateTime<Utc> },
}

impl SuppressReason {
    /// Message returned to the publisher.
    pub fn message(&self) -> &'static str {
        match self {
            SuppressReason::Synthetic => "Rejecting notification; it has a synthetic transaction id.",
            SuppressReason::GeneratedCarousel => "Skipping generated carousel publish.",
            SuppressReason::OriginalPublished { .. }
            | SuppressReason::EarlierCarouselPublished { .. } => {
                "Skipping carousel publish; the original notification was published successfully."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Written,
    Suppressed(SuppressReason),
}

pub struct IngestService {
    filter: RepublishFilter,
    writer: Arc<dyn NotificationWriter + Send + Sync>,
    mapper: NotificationMapper,
    dump_requests: bool,
}

impl IngestService {
    pub fn new(
        lookup: Arc<dyn TransactionLookup + Send + Sync>,
        writer: Arc<dyn NotificationWriter + Send + Sync>,
        mapper: NotificationMapper,
        dump_requests: bool,
    ) -> Self {
        Self {
            filter: RepublishFilter::new(lookup),
            writer,
            mapper,
            dump_requests,
        }
    }

    pub async fn ingest(
        &self,
        path_uuid: &str,
        transaction_id: Option<&str>,
        body: &[u8],
    ) -> Result<IngestOutcome> {
        if self.dump_requests {
            tracing::info!(
                uuid = %path_uuid,
                transaction_id = transaction_id.unwrap_or_default(),
                body = %String::from_utf8_lossy(body),
                "Received list notification"
            );
        }

        let tid = match synthetic::screen(transaction_id)? {
            Screening::Proceed(tid) => tid,
            Screening::Synthetic => return Ok(IngestOutcome::Suppressed(SuppressReason::Synthetic)),
        };

        if let Some(reason) = self.filter.check(path_uuid, tid).await {
            return Ok(IngestOutcome::Suppressed(reason));
        }

        let notification = self.mapper.map_request(path_uuid, body).map_err(|e| {
            tracing::error!(
                uuid = %path_uuid,
                transaction_id = %tid,
                error = %e,
                "Failed to parse json request! See error for details."
            );
            e
        })?;

        self.writer.write(&notification).await?;
        tracing::info!(
            uuid = %notification.uuid,
            transaction_id = %tid,
            last_modified = %notification.last_modified,
            "Wrote list notification"
        );

        Ok(IngestOutcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::app::NotificationsError;
    use crate::domain::Notification;
    use crate::store::SqliteStore;

    const LIST_UUID: &str = "9d1cd9d6-2a0e-11e6-8b18-91555f2934cd";

    fn body(uuid: &str, tid: &str) -> String {
        format!(
            r#"{{"uuid":"{}","title":"Top Stories","publishReference":"{}","lastModified":"2017-05-01T02:35:35.123Z"}}"#,
            uuid, tid
        )
    }

    fn service(store: &SqliteStore) -> IngestService {
        IngestService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            NotificationMapper::new("api.example.com"),
            true,
        )
    }

    #[tokio::test]
    async fn test_ordinary_publish_written() {
        let store = SqliteStore::in_memory().unwrap();
        let outcome = service(&store)
            .ingest(LIST_UUID, Some("tid_1"), body(LIST_UUID, "tid_1").as_bytes())
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Written);
        let stored = store.find_by_publish_reference("tid_1").unwrap().unwrap();
        assert_eq!(stored.uuid, LIST_UUID);
        assert_eq!(stored.title, "Top Stories");
    }

    #[tokio::test]
    async fn test_carousel_republish_suppressed_after_original() {
        let store = SqliteStore::in_memory().unwrap();
        let ingest = service(&store);

        ingest
            .ingest(LIST_UUID, Some("tid_1"), body(LIST_UUID, "tid_1").as_bytes())
            .await
            .unwrap();

        let republish = "tid_1_carousel_1493606135";
        let outcome = ingest
            .ingest(LIST_UUID, Some(republish), body(LIST_UUID, republish).as_bytes())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            IngestOutcome::Suppressed(SuppressReason::OriginalPublished { .. })
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_carousel_republish_suppressed() {
        let store = SqliteStore::in_memory().unwrap();
        let ingest = service(&store);

        let first = "tid_7_carousel_1493606135";
        assert_eq!(
            ingest
                .ingest(LIST_UUID, Some(first), body(LIST_UUID, first).as_bytes())
                .await
                .unwrap(),
            IngestOutcome::Written
        );

        let second = "tid_7_carousel_1493692535";
        let outcome = ingest
            .ingest(LIST_UUID, Some(second), body(LIST_UUID, second).as_bytes())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            IngestOutcome::Suppressed(SuppressReason::EarlierCarouselPublished { .. })
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_synthetic_and_generated_never_written() {
        let store = SqliteStore::in_memory().unwrap();
        let ingest = service(&store);

        let outcome = ingest
            .ingest(LIST_UUID, Some("SYNTHETIC-REQ-MON_x"), body(LIST_UUID, "x").as_bytes())
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Suppressed(SuppressReason::Synthetic));

        let generated = "tid_1_carousel_1493606135_gentx";
        let outcome = ingest
            .ingest(LIST_UUID, Some(generated), body(LIST_UUID, generated).as_bytes())
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Suppressed(SuppressReason::GeneratedCarousel));

        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_transaction_id_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let err = service(&store)
            .ingest(LIST_UUID, None, body(LIST_UUID, "tid_1").as_bytes())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_uuid_mismatch_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let other = uuid::Uuid::new_v4().to_string();
        let err = service(&store)
            .ingest(&other, Some("tid_1"), body(LIST_UUID, "tid_1").as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationsError::MalformedNotification(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    struct FailingWriter;

    #[async_trait]
    impl NotificationWriter for FailingWriter {
        async fn write(&self, _notification: &Notification) -> Result<()> {
            Err(NotificationsError::Store("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_server_error() {
        let store = SqliteStore::in_memory().unwrap();
        let ingest = IngestService::new(
            Arc::new(store),
            Arc::new(FailingWriter),
            NotificationMapper::new("api.example.com"),
            false,
        );

        let err = ingest
            .ingest(LIST_UUID, Some("tid_1"), body(LIST_UUID, "tid_1").as_bytes())
            .await
            .unwrap_err();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_suppress_messages() {
        assert_eq!(
            SuppressReason::GeneratedCarousel.message(),
            "Skipping generated carousel publish."
        );
        assert!(SuppressReason::Synthetic.message().contains("synthetic"));
    }
}

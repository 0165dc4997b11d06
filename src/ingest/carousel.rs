//! Suppression of carousel republishes.
//!
//! The carousel periodically rebroadcasts unchanged lists under a derived
//! transaction id. A republish is dropped when the publish it repeats has
//! already been recorded, either under the original id or as an earlier
//! carousel publish of it.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::SuppressReason;
use crate::store::TransactionLookup;

static GENERATED_CAROUSEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(tid_\S+)_carousel_\d{10}_gentx").expect("valid generated carousel regex")
});

static CAROUSEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_carousel_\d{10}").expect("valid carousel regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Ordinary,
    GeneratedCarousel,
    Carousel { original: String },
}

impl TransactionKind {
    pub fn classify(transaction_id: &str) -> Self {
        if GENERATED_CAROUSEL_RE.is_match(transaction_id) {
            return TransactionKind::GeneratedCarousel;
        }

        match CAROUSEL_RE.captures(transaction_id).and_then(|c| c.get(1)) {
            Some(original) => TransactionKind::Carousel {
                original: original.as_str().to_string(),
            },
            None => TransactionKind::Ordinary,
        }
    }
}

pub struct RepublishFilter {
    lookup: Arc<dyn TransactionLookup + Send + Sync>,
}

impl RepublishFilter {
    pub fn new(lookup: Arc<dyn TransactionLookup + Send + Sync>) -> Self {
        Self { lookup }
    }

    /// Returns why the write should be suppressed, or `None` to let it
    /// through. Lookup failures never block a write.
    pub async fn check(&self, uuid: &str, transaction_id: &str) -> Option<SuppressReason> {
        let original = match TransactionKind::classify(transaction_id) {
            TransactionKind::Ordinary => return None,
            TransactionKind::GeneratedCarousel => {
                tracing::info!(
                    uuid = %uuid,
                    transaction_id = %transaction_id,
                    "Skipping generated carousel publish."
                );
                return Some(SuppressReason::GeneratedCarousel);
            }
            TransactionKind::Carousel { original } => original,
        };

        tracing::info!(uuid = %uuid, transaction_id = %transaction_id, "Received carousel notification.");

        match self.lookup.find_by_transaction_id(&original).await {
            Ok(Some(found)) => {
                tracing::info!(
                    uuid = %uuid,
                    transaction_id = %transaction_id,
                    last_modified = %found.last_modified,
                    "Skipping carousel publish; the original notification was published successfully."
                );
                return Some(SuppressReason::OriginalPublished {
                    last_modified: found.last_modified,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    uuid = %uuid,
                    transaction_id = %transaction_id,
                    error = %e,
                    "Failed to find original notification for this carousel publish! Writing new notification."
                );
                return None;
            }
        }

        tracing::info!(
            uuid = %uuid,
            transaction_id = %transaction_id,
            "Failed to find notification for original transaction ID, checking for a related carousel transaction."
        );

        let prefix = format!("{}_carousel", original);
        match self.lookup.find_by_transaction_id_prefix(&prefix).await {
            Ok(Some(found)) => {
                tracing::info!(
                    uuid = %uuid,
                    transaction_id = %transaction_id,
                    last_modified = %found.last_modified,
                    "Skipping carousel publish; an earlier carousel publish was recorded."
                );
                Some(SuppressReason::EarlierCarouselPublished {
                    last_modified: found.last_modified,
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!(
                    uuid = %uuid,
                    transaction_id = %transaction_id,
                    error = %e,
                    "Failed to find original notification for this carousel publish! Writing new notification."
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::app::{NotificationsError, Result};
    use crate::domain::Notification;

    const UUID: &str = "9d1cd9d6-2a0e-11e6-8b18-91555f2934cd";

    #[derive(Clone, Copy)]
    enum Answer {
        Found,
        Missing,
        Fails,
    }

    /// Scripted lookup that records every call it receives.
    struct FakeLookup {
        exact: Answer,
        prefix: Answer,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new(exact: Answer, prefix: Answer) -> Arc<Self> {
            Arc::new(Self {
                exact,
                prefix,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, answer: Answer, call: String) -> Result<Option<Notification>> {
            self.calls.lock().unwrap().push(call);
            match answer {
                Answer::Found => Ok(Some(Notification::new(
                    UUID,
                    Utc.with_ymd_and_hms(2017, 5, 1, 2, 35, 35).unwrap(),
                ))),
                Answer::Missing => Ok(None),
                Answer::Fails => Err(NotificationsError::Store(
                    "blew up finding that pesky original publish".into(),
                )),
            }
        }
    }

    #[async_trait]
    impl TransactionLookup for FakeLookup {
        async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Notification>> {
            self.answer(self.exact, format!("exact:{}", transaction_id))
        }

        async fn find_by_transaction_id_prefix(&self, prefix: &str) -> Result<Option<Notification>> {
            self.answer(self.prefix, format!("prefix:{}", prefix))
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(TransactionKind::classify("tid_123761283"), TransactionKind::Ordinary);
        assert_eq!(
            TransactionKind::classify("tid_123761283_carousel_1234567890_gentx"),
            TransactionKind::GeneratedCarousel
        );
        assert_eq!(
            TransactionKind::classify("tid_123761283_carousel_1234567890"),
            TransactionKind::Carousel {
                original: "tid_123761283".into()
            }
        );
        assert_eq!(
            TransactionKind::classify("tid_123761283_carousel_12345"),
            TransactionKind::Ordinary
        );
    }

    #[test]
    fn test_classify_unconventional_transaction_id() {
        assert_eq!(
            TransactionKind::classify(
                "republish_-10bd337c-66d4-48d9-ab8a-e8441fa2ec98_carousel_1493606135"
            ),
            TransactionKind::Carousel {
                original: "republish_-10bd337c-66d4-48d9-ab8a-e8441fa2ec98".into()
            }
        );
    }

    #[tokio::test]
    async fn test_ordinary_publish_never_looks_up() {
        let lookup = FakeLookup::new(Answer::Found, Answer::Found);
        let filter = RepublishFilter::new(lookup.clone());

        assert!(filter.check(UUID, "tid_123761283").await.is_none());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generated_carousel_suppressed_without_lookup() {
        let lookup = FakeLookup::new(Answer::Missing, Answer::Missing);
        let filter = RepublishFilter::new(lookup.clone());

        let reason = filter
            .check(UUID, "tid_123761283_carousel_1234567890_gentx")
            .await;
        assert_eq!(reason, Some(SuppressReason::GeneratedCarousel));
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_carousel_with_original_published() {
        let lookup = FakeLookup::new(Answer::Found, Answer::Missing);
        let filter = RepublishFilter::new(lookup.clone());

        let reason = filter.check(UUID, "tid_123761283_carousel_1234567890").await;
        assert!(matches!(reason, Some(SuppressReason::OriginalPublished { .. })));
        assert_eq!(lookup.calls(), vec!["exact:tid_123761283"]);
    }

    #[tokio::test]
    async fn test_unconventional_carousel_with_original_published() {
        let lookup = FakeLookup::new(Answer::Found, Answer::Missing);
        let filter = RepublishFilter::new(lookup.clone());

        let reason = filter
            .check(
                UUID,
                "republish_-10bd337c-66d4-48d9-ab8a-e8441fa2ec98_carousel_1493606135",
            )
            .await;
        assert!(reason.is_some());
        assert_eq!(
            lookup.calls(),
            vec!["exact:republish_-10bd337c-66d4-48d9-ab8a-e8441fa2ec98"]
        );
    }

    #[tokio::test]
    async fn test_partial_carousel_published() {
        let lookup = FakeLookup::new(Answer::Missing, Answer::Found);
        let filter = RepublishFilter::new(lookup.clone());

        let reason = filter.check(UUID, "tid_123761283_carousel_1234567890").await;
        assert!(matches!(
            reason,
            Some(SuppressReason::EarlierCarouselPublished { .. })
        ));
        assert_eq!(
            lookup.calls(),
            vec!["exact:tid_123761283", "prefix:tid_123761283_carousel"]
        );
    }

    #[tokio::test]
    async fn test_no_original_publish() {
        let lookup = FakeLookup::new(Answer::Missing, Answer::Missing);
        let filter = RepublishFilter::new(lookup.clone());

        assert!(filter
            .check(UUID, "tid_123761283_carousel_1234567890")
            .await
            .is_none());
        assert_eq!(lookup.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_finding_original_publish() {
        let lookup = FakeLookup::new(Answer::Fails, Answer::Found);
        let filter = RepublishFilter::new(lookup.clone());

        assert!(filter
            .check(UUID, "tid_123761283_carousel_1234567890")
            .await
            .is_none());
        assert_eq!(lookup.calls(), vec!["exact:tid_123761283"]);
    }

    #[tokio::test]
    async fn test_error_finding_partial_carousel_publish() {
        let lookup = FakeLookup::new(Answer::Missing, Answer::Fails);
        let filter = RepublishFilter::new(lookup.clone());

        assert!(filter
            .check(UUID, "tid_123761283_carousel_1234567890")
            .await
            .is_none());
        assert_eq!(lookup.calls().len(), 2);
    }
}

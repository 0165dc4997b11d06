use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::app::{NotificationsError, Result};
use crate::domain::notification::{DEFAULT_EVENT_TYPE, UPDATE_CHANGE_TYPE};
use crate::domain::{Notification, PublicNotification};

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]{8}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{12}$")
        .expect("valid uuid regex")
});

/// Wire shape of a `PUT /lists/{uuid}` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUpdate {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    publish_reference: String,
    last_modified: DateTime<Utc>,
}

pub fn is_uuid(s: &str) -> bool {
    UUID_RE.is_match(s)
}

/// Maps request bodies to stored records, and stored records to their
/// public projection under the configured API host.
#[derive(Debug, Clone)]
pub struct NotificationMapper {
    api_host: String,
}

impl NotificationMapper {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Decodes and validates a list update against the uuid in the request path.
    pub fn map_request(&self, path_uuid: &str, body: &[u8]) -> Result<Notification> {
        let update: ListUpdate = serde_json::from_slice(body).map_err(|e| {
            NotificationsError::MalformedNotification(format!(
                "Failed to parse json for list body: {}",
                e
            ))
        })?;

        if !is_uuid(&update.uuid) {
            return Err(NotificationsError::MalformedNotification(
                "List document contained an invalid UUID".into(),
            ));
        }

        if update.uuid != path_uuid {
            return Err(NotificationsError::MalformedNotification(
                "List document contained a different UUID to the request URI".into(),
            ));
        }

        let event_type = update
            .event_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string());

        Ok(Notification {
            uuid: update.uuid,
            title: update.title,
            event_type,
            publish_reference: update.publish_reference,
            last_modified: update.last_modified,
        })
    }

    pub fn to_public(&self, notification: &Notification) -> PublicNotification {
        PublicNotification {
            change_type: UPDATE_CHANGE_TYPE.to_string(),
            id: format!("http://{}/things/{}", self.api_host, notification.uuid),
            api_url: format!("http://{}/lists/{}", self.api_host, notification.uuid),
            title: notification.title.clone(),
            publish_reference: notification.publish_reference.clone(),
            last_modified: notification.last_modified.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LIST_UUID: &str = "9d1cd9d6-2a0e-11e6-8b18-91555f2934cd";

    fn mapper() -> NotificationMapper {
        NotificationMapper::new("api.example.com")
    }

    fn body(uuid: &str) -> String {
        format!(
            r#"{{"uuid":"{}","title":"Editor's Picks","eventType":"UPDATE","publishReference":"tid_abc","lastModified":"2016-10-26T16:15:09.46Z"}}"#,
            uuid
        )
    }

    #[test]
    fn test_map_request() {
        let notification = mapper()
            .map_request(LIST_UUID, body(LIST_UUID).as_bytes())
            .unwrap();

        assert_eq!(notification.uuid, LIST_UUID);
        assert_eq!(notification.title, "Editor's Picks");
        assert_eq!(notification.publish_reference, "tid_abc");
        assert_eq!(
            notification.last_modified,
            Utc.with_ymd_and_hms(2016, 10, 26, 16, 15, 9).unwrap()
                + chrono::Duration::milliseconds(460)
        );
    }

    #[test]
    fn test_map_request_defaults_event_type() {
        let json = format!(
            r#"{{"uuid":"{}","title":"t","publishReference":"tid_abc","lastModified":"2016-10-26T16:15:09Z"}}"#,
            LIST_UUID
        );
        let notification = mapper().map_request(LIST_UUID, json.as_bytes()).unwrap();
        assert_eq!(notification.event_type, "UPDATE");

        let json = format!(
            r#"{{"uuid":"{}","eventType":"","lastModified":"2016-10-26T16:15:09Z"}}"#,
            LIST_UUID
        );
        let notification = mapper().map_request(LIST_UUID, json.as_bytes()).unwrap();
        assert_eq!(notification.event_type, "UPDATE");
    }

    #[test]
    fn test_map_request_not_json() {
        let err = mapper().map_request(LIST_UUID, b"<list/>").unwrap_err();
        assert!(matches!(err, NotificationsError::MalformedNotification(_)));
    }

    #[test]
    fn test_map_request_missing_uuid() {
        let err = mapper()
            .map_request(LIST_UUID, br#"{"lastModified":"2016-10-26T16:15:09Z"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid UUID"));
    }

    #[test]
    fn test_map_request_invalid_uuid() {
        let err = mapper()
            .map_request("not-a-uuid", body("not-a-uuid").as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("invalid UUID"));
    }

    #[test]
    fn test_map_request_uuid_mismatch() {
        let other = "0a3a2c5e-2a0e-11e6-8b18-91555f2934cd";
        let err = mapper()
            .map_request(other, body(LIST_UUID).as_bytes())
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("different UUID"));
    }

    #[test]
    fn test_is_uuid_is_anchored() {
        assert!(is_uuid(LIST_UUID));
        assert!(!is_uuid(&format!("x{}", LIST_UUID)));
        assert!(!is_uuid(&format!("{}/", LIST_UUID)));
        assert!(!is_uuid(&LIST_UUID.to_uppercase()));
    }

    #[test]
    fn test_to_public() {
        let last_modified = Utc.with_ymd_and_hms(2016, 10, 26, 16, 15, 9).unwrap();
        let notification = Notification::new(LIST_UUID, last_modified)
            .with_title("Editor's Picks")
            .with_publish_reference("tid_abc");

        let public = mapper().to_public(&notification);
        assert_eq!(public.id, format!("http://api.example.com/things/{}", LIST_UUID));
        assert_eq!(public.api_url, format!("http://api.example.com/lists/{}", LIST_UUID));
        assert_eq!(public.change_type, UPDATE_CHANGE_TYPE);
        assert_eq!(public.title, "Editor's Picks");
        assert_eq!(public.publish_reference, "tid_abc");
        assert_eq!(public.last_modified, last_modified);
    }
}

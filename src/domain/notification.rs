use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_TYPE: &str = "UPDATE";

/// Change type advertised on every public notification.
pub const UPDATE_CHANGE_TYPE: &str = "http://www.ft.com/thing/ThingChangeType/UPDATE";

/// A single publish event for a list, as recorded in the store.
///
/// One record exists per physical publish; several records may share a
/// `uuid`. Collapsing them to one per list happens when the feed is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub uuid: String,
    pub title: String,
    pub event_type: String,
    pub publish_reference: String,
    pub last_modified: DateTime<Utc>,
}

impl Notification {
    pub fn new(uuid: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            uuid: uuid.into(),
            title: String::new(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            publish_reference: String::new(),
            last_modified,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_publish_reference(mut self, publish_reference: impl Into<String>) -> Self {
        self.publish_reference = publish_reference.into();
        self
    }
}

/// The consumer-facing view of a [`Notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicNotification {
    #[serde(rename = "type")]
    pub change_type: String,
    pub id: String,
    pub api_url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publish_reference: String,
    pub last_modified: DateTime<Utc>,
}

/// Formats a timestamp as RFC 3339 with nine fractional digits and a `Z`.
///
/// The output has a fixed width, so lexical order equals chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2016, 10, 26, 16, 15, 9).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(460);

        assert_eq!(format_timestamp(&whole), "2016-10-26T16:15:09.000000000Z");
        assert_eq!(format_timestamp(&fractional), "2016-10-26T16:15:09.460000000Z");
        assert!(format_timestamp(&whole) < format_timestamp(&fractional));
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2016-10-26T17:15:09.46+01:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2016-10-26T16:15:09.460000000Z");
    }

    #[test]
    fn test_parse_timestamp_rejects_junk() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2016-10-26").is_none());
    }

    #[test]
    fn test_public_notification_omits_empty_publish_reference() {
        let public = PublicNotification {
            change_type: UPDATE_CHANGE_TYPE.into(),
            id: "http://api.ft.com/things/x".into(),
            api_url: "http://api.ft.com/lists/x".into(),
            title: "Top Stories".into(),
            publish_reference: String::new(),
            last_modified: Utc.with_ymd_and_hms(2016, 10, 26, 16, 15, 9).unwrap(),
        };

        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["type"], UPDATE_CHANGE_TYPE);
        assert_eq!(json["apiUrl"], "http://api.ft.com/lists/x");
        assert!(json.get("publishReference").is_none());
    }
}

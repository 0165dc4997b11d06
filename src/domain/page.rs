use serde::{Deserialize, Serialize};

use crate::domain::PublicNotification;

pub const NEXT_REL: &str = "next";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn next(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: NEXT_REL.to_string(),
        }
    }
}

/// One page of the notification feed, as returned to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub request_url: String,
    pub notifications: Vec<PublicNotification>,
    pub links: Vec<Link>,
}

impl NotificationPage {
    /// The `next` link, if the page carries one.
    pub fn next_link(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == NEXT_REL)
    }
}

//! Resumption cursors for the notification feed.
//!
//! A cursor is `(since, offset)`: resume at notifications modified at or
//! after `since`, skipping `offset` records that share the boundary
//! timestamp. The engine derives the next cursor from the page just read.

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::app::{NotificationsError, Result};
use crate::domain::{format_timestamp, parse_timestamp, Link};
use crate::feed::page::ResultPage;

pub const NOTIFICATIONS_PATH: &str = "/lists/notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub since: DateTime<Utc>,
    pub offset: usize,
}

impl Cursor {
    pub fn new(since: DateTime<Utc>, offset: usize) -> Self {
        Self { since, offset }
    }

    /// Parses the `since` and `offset` query parameters of a feed read.
    ///
    /// `since` is mandatory, must be RFC 3339 and must not be older than
    /// `max_since` before `now`. A missing `offset` means zero.
    pub fn from_params(
        since: Option<&str>,
        offset: Option<&str>,
        now: DateTime<Utc>,
        max_since: Duration,
    ) -> Result<Self> {
        let since = since
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NotificationsError::InvalidRequest(since_message(now)))?;

        let since = parse_timestamp(since).ok_or_else(|| {
            tracing::info!(since = %since, "Failed to parse user provided since date");
            NotificationsError::InvalidRequest(since_message(now))
        })?;

        let cap = now.checked_sub_signed(max_since).unwrap_or(DateTime::<Utc>::MIN_UTC);
        if since < cap {
            tracing::info!(
                since = %format_timestamp(&since),
                "User provided since date before query cap date"
            );
            return Err(NotificationsError::InvalidRequest(format!(
                "Since date must be within the last {} days.",
                max_since.num_days()
            )));
        }

        // Offsets must fit a signed 64-bit SQL OFFSET.
        let offset = match offset.filter(|o| !o.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .and_then(|o| usize::try_from(o).ok())
                .ok_or_else(|| {
                    tracing::info!(offset = %raw, "User provided offset is not an integer");
                    NotificationsError::InvalidRequest("Please specify an integer offset.".into())
                })?,
            None => 0,
        };

        Ok(Self { since, offset })
    }
}

fn since_message(now: DateTime<Utc>) -> String {
    let example = now - Duration::days(1);
    format!(
        "A mandatory 'since' query parameter has not been specified. Please supply a since date. For eg., since={} .",
        format_timestamp(&example)
    )
}

/// Computes and renders the cursor that follows a page.
#[derive(Debug, Clone)]
pub struct CursorEngine {
    base: Url,
    cache_delay: Duration,
}

impl CursorEngine {
    pub fn new(api_host: &str, cache_delay: Duration) -> Result<Self> {
        let base = Url::parse(&format!("http://{}{}", api_host, NOTIFICATIONS_PATH))?;
        Ok(Self { base, cache_delay })
    }

    pub fn next_cursor(&self, current: &Cursor, page: &ResultPage) -> Cursor {
        Cursor {
            since: self.next_since(current, page),
            offset: next_offset(page, current.offset),
        }
    }

    pub fn next_link(&self, current: &Cursor, page: &ResultPage) -> Link {
        self.render(&self.next_cursor(current, page))
    }

    /// Renders a cursor as a `next` link; a zero offset is left out.
    pub fn render(&self, cursor: &Cursor) -> Link {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            if cursor.offset > 0 {
                query.append_pair("offset", &cursor.offset.to_string());
            }
            query.append_pair("since", &format_timestamp(&cursor.since));
        }
        Link::next(url.to_string())
    }

    /// The last delivered timestamp, with the cache delay added back so the
    /// cursor carries an absolute `since`. The next read subtracts it again.
    fn next_since(&self, current: &Cursor, page: &ResultPage) -> DateTime<Utc> {
        match page.delivered.last() {
            Some(last) => last
                .last_modified
                .checked_add_signed(self.cache_delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            None => current.since,
        }
    }
}

fn next_offset(page: &ResultPage, current_offset: usize) -> usize {
    if page.is_empty() {
        return current_offset;
    }

    if !page.is_truncated() || !boundary_tied(page) {
        return 0;
    }

    let size = boundary_size(page);
    if size == page.len() {
        // The whole page sits on one timestamp; keep walking forward through it.
        current_offset.saturating_add(size - 1)
    } else {
        // Minus the sentinel, which was never delivered.
        size - 1
    }
}

/// True when the last delivered record and the sentinel share a timestamp.
fn boundary_tied(page: &ResultPage) -> bool {
    match (page.delivered.last(), page.sentinel.as_ref()) {
        (Some(last), Some(sentinel)) => last.last_modified == sentinel.last_modified,
        _ => false,
    }
}

/// Count of trailing records sharing the final record's timestamp.
fn boundary_size(page: &ResultPage) -> usize {
    let mut records = page.records().rev();
    let Some(boundary) = records.next() else {
        return 0;
    };

    1 + records
        .take_while(|n| n.last_modified == boundary.last_modified)
        .count()
}

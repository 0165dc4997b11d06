//! Construction of the windowed, deduplicating feed query.
//!
//! Both ends of the window are pulled back by the cache delay. A write that
//! has not reached every replica yet stays invisible until the delay has
//! elapsed, so no cursor can move past a notification a reader cannot see.

use chrono::{DateTime, Duration, Utc};

use crate::feed::cursor::Cursor;

/// How the window bounds compare against `lastModified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBounds {
    /// `start < lastModified < end`. Used when the caller has consumed the
    /// boundary timestamp entirely.
    Exclusive,
    /// `start <= lastModified <= end`. Used mid-way through a tied boundary,
    /// which must be scanned again.
    Inclusive,
}

/// A fully specified read against the notification store.
///
/// Executors must, in order:
/// 1. keep records whose `lastModified` falls inside the window,
/// 2. collapse them to one record per `uuid`, keeping the most recently
///    modified one (the most recently stored one on a timestamp tie),
/// 3. order the survivors by `lastModified` then `uuid`, both ascending,
/// 4. skip `offset` records and return at most `fetch` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub bounds: WindowBounds,
    pub offset: usize,
    /// Page limit plus one sentinel record.
    pub fetch: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    cache_delay: Duration,
    limit: usize,
}

impl QueryBuilder {
    pub fn new(cache_delay: Duration, limit: usize) -> Self {
        Self { cache_delay, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn build(&self, cursor: &Cursor, now: DateTime<Utc>) -> NotificationQuery {
        let bounds = if cursor.offset > 0 {
            WindowBounds::Inclusive
        } else {
            WindowBounds::Exclusive
        };

        NotificationQuery {
            window_start: shift_back(cursor.since, self.cache_delay),
            window_end: shift_back(now, self.cache_delay),
            bounds,
            offset: cursor.offset,
            fetch: self.limit.saturating_add(1),
        }
    }
}

fn shift_back(ts: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    ts.checked_sub_signed(delay)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

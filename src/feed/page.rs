use crate::domain::Notification;

/// A page read from the store, split into what gets delivered and the
/// optional sentinel record that signals truncation.
///
/// The sentinel only informs cursor arithmetic; it is never delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub delivered: Vec<Notification>,
    pub sentinel: Option<Notification>,
}

impl ResultPage {
    /// Splits a raw result of up to `limit + 1` records.
    ///
    /// Anything past the first record beyond `limit` is discarded.
    pub fn split(mut raw: Vec<Notification>, limit: usize) -> Self {
        if raw.len() <= limit {
            return Self {
                delivered: raw,
                sentinel: None,
            };
        }

        raw.truncate(limit + 1);
        let sentinel = raw.pop();
        Self {
            delivered: raw,
            sentinel,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Number of records read, sentinel included.
    pub fn len(&self) -> usize {
        self.delivered.len() + usize::from(self.sentinel.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record read, in store order, sentinel last.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.delivered.iter().chain(self.sentinel.iter())
    }
}

use crate::app::{NotificationsError, Result};

pub const SYNTHETIC_PREFIX: &str = "SYNTHETIC-REQ-MON";

/// What to do with a write, judged by its transaction id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening<'a> {
    Proceed(&'a str),
    Synthetic,
}

/// Rejects writes without a transaction id and screens out synthetic
/// monitoring traffic.
pub fn screen(transaction_id: Option<&str>) -> Result<Screening<'_>> {
    let tid = match transaction_id.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tid) => tid,
        None => {
            tracing::info!("Rejecting notification; it has no transaction id.");
            return Err(NotificationsError::InvalidRequest(
                "Rejecting notification; it has no transaction id.".into(),
            ));
        }
    };

    if tid.to_uppercase().starts_with(SYNTHETIC_PREFIX) {
        tracing::info!(
            transaction_id = %tid,
            "Rejecting notification; it has a synthetic transaction id."
        );
        return Ok(Screening::Synthetic);
    }

    Ok(Screening::Proceed(tid))
}

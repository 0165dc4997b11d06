use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::{ApiError, Message, TRANSACTION_ID_HEADER};
use crate::ingest::{IngestOutcome, IngestService};

/// `PUT /lists/{uuid}`
pub async fn write_notification(
    State(ingest): State<Arc<IngestService>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let transaction_id = headers
        .get(TRANSACTION_ID_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = ingest
        .ingest(&uuid, transaction_id, &body)
        .await
        .map_err(|e| ApiError::from_error(e, "Failed to write request."))?;

    Ok(match outcome {
        IngestOutcome::Written => StatusCode::OK.into_response(),
        IngestOutcome::Suppressed(reason) => {
            (StatusCode::OK, Json(Message::new(reason.message()))).into_response()
        }
    })
}

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Uri,
    Json,
};
use serde::Deserialize;

use crate::domain::NotificationPage;
use crate::app::NotificationsError;
use crate::feed::{FeedService, NOTIFICATIONS_PATH};
use crate::http::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    pub since: Option<String>,
    pub offset: Option<String>,
}

/// `GET /lists/notifications?since=&offset=`
pub async fn read_notifications(
    State(feed): State<Arc<FeedService>>,
    query: Result<Query<ReadParams>, QueryRejection>,
    uri: Uri,
) -> Result<Json<NotificationPage>, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        tracing::info!(error = %rejection, "Unreadable query string");
        ApiError::from(NotificationsError::InvalidRequest(rejection.body_text()))
    })?;

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(NOTIFICATIONS_PATH);

    let page = feed
        .read(params.since.as_deref(), params.offset.as_deref(), path_and_query)
        .await
        .map_err(|e| {
            ApiError::from_error(
                e,
                "Failed to retrieve list notifications due to internal server error",
            )
        })?;

    Ok(Json(page))
}

//! Axum router configuration
//!
//! ```text
//! /
//! ├── GET  /lists/notifications  - notification feed
//! ├── PUT  /lists/{uuid}         - list publish events
//! ├── GET  /__health             - health report
//! ├── GET  /__gtg                - good-to-go
//! ├── GET  /__ping               - liveness
//! ├── GET  /__build-info         - name and version
//! └── POST /__log                - runtime log level
//! ```

pub mod admin;
pub mod read;
pub mod write;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::app::{AppContext, LogControl, NotificationsError};
use crate::feed::NOTIFICATIONS_PATH;
use crate::store::StoreHealth;

pub const TRANSACTION_ID_HEADER: &str = "X-Request-Id";

/// JSON body of every non-page response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Client errors carry their own message; anything else is reported
    /// with `server_message` and logged.
    pub fn from_error(err: NotificationsError, server_message: &str) -> Self {
        if err.is_client_error() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            };
        }

        tracing::error!(error = %err, "{}", server_message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: server_message.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<NotificationsError> for ApiError {
    fn from(err: NotificationsError) -> Self {
        Self::from_error(err, "An internal server error prevented processing of your request.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Message::new(self.message))).into_response()
    }
}

/// Build the complete router.
pub fn build_router(ctx: &AppContext, logs: LogControl) -> Router {
    Router::new()
        .route(
            NOTIFICATIONS_PATH,
            get(read::read_notifications).with_state(ctx.feed.clone()),
        )
        .route(
            "/lists/{uuid}",
            put(write::write_notification).with_state(ctx.ingest.clone()),
        )
        .merge(admin_router(ctx.health.clone(), logs))
}

/// Operational endpoints.
fn admin_router(health: Arc<dyn StoreHealth + Send + Sync>, logs: LogControl) -> Router {
    Router::new()
        .route("/__health", get(admin::health).with_state(health.clone()))
        .route("/__gtg", get(admin::good_to_go).with_state(health))
        .route("/__ping", get(admin::ping))
        .route("/__build-info", get(admin::build_info))
        .route("/__log", post(admin::update_log_level).with_state(logs))
}

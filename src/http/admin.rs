use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::LogControl;
use crate::http::{ApiError, Message};
use crate::store::StoreHealth;

const STORE_CHECK: &str = "CheckConnectivityToListsDatabase";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub check_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub name: String,
    pub ok: bool,
    pub checks: Vec<HealthCheck>,
}

async fn store_check(store: &(dyn StoreHealth + Send + Sync)) -> HealthCheck {
    let (ok, check_output) = match store.ping().await {
        Ok(()) => (true, "OK".to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Store connectivity check failed");
            (false, e.to_string())
        }
    };

    HealthCheck {
        name: STORE_CHECK.to_string(),
        ok,
        severity: 1,
        business_impact: "Notifications for list changes will not be available to API consumers."
            .to_string(),
        technical_summary: "The service is unable to reach its store. Notifications cannot be written to or read from the store."
            .to_string(),
        check_output,
    }
}

/// `GET /__health`; always 200, the report carries the outcome.
pub async fn health(State(store): State<Arc<dyn StoreHealth + Send + Sync>>) -> Json<HealthReport> {
    let check = store_check(store.as_ref()).await;
    Json(HealthReport {
        name: env!("CARGO_PKG_NAME").to_string(),
        ok: check.ok,
        checks: vec![check],
    })
}

/// `GET /__gtg`
pub async fn good_to_go(State(store): State<Arc<dyn StoreHealth + Send + Sync>>) -> Response {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

/// `GET /__ping`
pub async fn ping() -> &'static str {
    "pong"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
}

/// `GET /__build-info`
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct LevelRequest {
    level: String,
}

/// `POST /__log` with `{"level": "debug"}` or `{"level": "info"}`.
pub async fn update_log_level(
    State(logs): State<LogControl>,
    body: Bytes,
) -> Result<Json<Message>, ApiError> {
    let level = serde_json::from_slice::<LevelRequest>(&body)
        .map(|r| r.level)
        .unwrap_or_default();

    logs.set_level(&level)?;
    Ok(Json(Message::new(format!("Log level changed to {}", level))))
}

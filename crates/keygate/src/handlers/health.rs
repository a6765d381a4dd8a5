//! health check endpoint handler.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio::time::timeout;

use keygate_store::Store;

use crate::AppState;

/// health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// timeout for the database ping.
const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /health
///
/// checks database connectivity; `{"status": "pass"}` when healthy.
pub async fn health(State(state): State<AppState>) -> Response {
    let ping_result = timeout(PING_TIMEOUT, state.store.ping()).await;

    let (status_code, status) = match ping_result {
        Ok(Ok(())) => (StatusCode::OK, "pass"),
        Ok(Err(_)) | Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "fail"),
    };

    (status_code, Json(HealthResponse { status })).into_response()
}

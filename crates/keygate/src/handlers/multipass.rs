//! multipass token issue and prolongation endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

use keygate_access::MultipassService;
use keygate_store::Store;

use crate::AppState;
use crate::handlers::ApiError;

/// issued token response.
#[derive(Debug, Serialize)]
pub struct MultipassTokenResponse {
    /// the signed token.
    pub token: String,
}

async fn rotate(
    state: &AppState,
    uuid: &str,
    prolong: bool,
) -> Result<Json<MultipassTokenResponse>, ApiError> {
    let mut multipass = state
        .store
        .get_multipass(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("multipass {}", uuid)))?;

    let service = MultipassService::new(state.signer(), state.config.token.issuer.clone());
    let now = Utc::now().timestamp();
    let token = if prolong {
        service.prolong(&mut multipass, now)?
    } else {
        service.issue(&mut multipass, now)?
    };

    // persist the rotated salt so older tokens stop matching
    state.store.update_multipass(&multipass).await?;

    Ok(Json(MultipassTokenResponse { token }))
}

/// POST /multipass/{uuid}/issue
pub async fn issue_multipass(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<MultipassTokenResponse>, ApiError> {
    rotate(&state, &uuid, false).await
}

/// POST /multipass/{uuid}/prolong
pub async fn prolong_multipass(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<MultipassTokenResponse>, ApiError> {
    rotate(&state, &uuid, true).await
}

//! effective-role resolution endpoint.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use keygate_access::EffectiveRole;
use keygate_types::SubjectRef;

use crate::AppState;
use crate::handlers::ApiError;
use crate::snapshot::load_catalog;

/// request body for effective-role resolution.
#[derive(Debug, Deserialize)]
pub struct CheckEffectiveRolesRequest {
    /// the subject to resolve for.
    pub subject: SubjectRef,
    /// role names to check, answered in request order.
    pub roles: Vec<String>,
}

/// effective-role resolution response.
#[derive(Debug, Serialize)]
pub struct CheckEffectiveRolesResponse {
    /// one entry per requested role.
    pub effective_roles: Vec<EffectiveRole>,
    /// non-fatal problems encountered during resolution.
    pub warnings: Vec<String>,
}

/// POST /check_effective_roles
pub async fn check_effective_roles(
    State(state): State<AppState>,
    Json(request): Json<CheckEffectiveRolesRequest>,
) -> Result<Json<CheckEffectiveRolesResponse>, ApiError> {
    let catalog = load_catalog(&state.store).await?;
    let (effective_roles, warnings) = keygate_access::effective_roles(
        &catalog,
        &request.subject,
        &request.roles,
        Utc::now().timestamp(),
    );
    Ok(Json(CheckEffectiveRolesResponse {
        effective_roles,
        warnings,
    }))
}

//! server discovery, posix materialization and extension configuration.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use keygate_access::{LabelSelector, PosixUser, QueryScope, jti_matches};
use keygate_store::{ServerAccessConfig, Store};
use keygate_types::{Server, SubjectKind};

use crate::AppState;
use crate::handlers::ApiError;
use crate::snapshot::load_catalog;

/// query parameters for server discovery.
#[derive(Debug, Deserialize)]
pub struct QueryServerParams {
    /// comma-separated server names; only honored inside a project.
    pub names: Option<String>,
    /// label selector expression.
    #[serde(rename = "labelSelector")]
    pub label_selector: Option<String>,
}

/// server discovery response.
#[derive(Debug, Serialize)]
pub struct QueryServerResponse {
    /// matching servers, reduced to the safe subset outside project scope.
    pub servers: Vec<Server>,
    /// non-fatal problems encountered while resolving the query.
    pub warnings: Vec<String>,
}

async fn run_query(
    state: &AppState,
    scope: QueryScope,
    params: QueryServerParams,
) -> Result<Json<QueryServerResponse>, ApiError> {
    let names: Vec<String> = params
        .names
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().to_string())
        .collect();

    let selector = match params.label_selector.as_deref() {
        Some(expr) => {
            Some(LabelSelector::parse(expr).map_err(|e| ApiError::bad_request(e.to_string()))?)
        }
        None => None,
    };

    let catalog = load_catalog(&state.store).await?;
    let (servers, warnings) =
        keygate_access::query_servers(&catalog, &scope, &names, selector.as_ref())?;
    Ok(Json(QueryServerResponse { servers, warnings }))
}

/// GET /query_server - discover servers across all tenants.
pub async fn query_servers_global(
    State(state): State<AppState>,
    Query(params): Query<QueryServerParams>,
) -> Result<Json<QueryServerResponse>, ApiError> {
    run_query(&state, QueryScope::Global, params).await
}

/// GET /tenant/{tenant}/query_server - discover servers of one tenant.
pub async fn query_servers_tenant(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(params): Query<QueryServerParams>,
) -> Result<Json<QueryServerResponse>, ApiError> {
    run_query(&state, QueryScope::Tenant(tenant), params).await
}

/// GET /tenant/{tenant}/project/{project}/query_server - discover servers
/// of one project, with full connection details.
pub async fn query_servers_project(
    State(state): State<AppState>,
    Path((tenant, project)): Path<(String, String)>,
    Query(params): Query<QueryServerParams>,
) -> Result<Json<QueryServerResponse>, ApiError> {
    run_query(&state, QueryScope::TenantProject(tenant, project), params).await
}

/// posix materialization response.
#[derive(Debug, Serialize)]
pub struct PosixUsersResponse {
    /// one account per subject with server access in the server's tenant.
    pub posix_users: Vec<PosixUser>,
    /// subjects skipped with a reason.
    pub warnings: Vec<String>,
}

/// GET /tenant/{tenant}/project/{project}/server/{server}/posix_users
pub async fn posix_users(
    State(state): State<AppState>,
    Path((tenant, project, server)): Path<(String, String, String)>,
) -> Result<Json<PosixUsersResponse>, ApiError> {
    let catalog = load_catalog(&state.store).await?;

    // the server must actually live under the addressed project
    if let Some(found) = keygate_access::Directory::server(&catalog, &server)
        && (found.tenant_uuid != tenant || found.project_uuid != project)
    {
        return Err(ApiError::not_found(format!("server {}", server)));
    }

    let (posix_users, warnings) = keygate_access::resolve_posix_users(&catalog, &server)?;
    Ok(Json(PosixUsersResponse {
        posix_users,
        warnings,
    }))
}

/// GET /tenant/{tenant}/project/{project}/server/{server}
///
/// full server view for the server itself; authenticated with the
/// server's own multipass token.
pub async fn show_server(
    State(state): State<AppState>,
    Path((tenant, project, server)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Server>, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

    let claims = state
        .signer()
        .verify(token, &state.config.token.issuer)
        .map_err(|_| ApiError::unauthorized("invalid token"))?;

    let record = state
        .store
        .get_server(&server)
        .await?
        .filter(|s| s.tenant_uuid == tenant && s.project_uuid == project)
        .ok_or_else(|| ApiError::not_found(format!("server {}", server)))?;
    if record.archive_mark.is_archived() {
        return Err(ApiError::not_found(format!("server {}", server)));
    }

    // the token must be the current issue of this server's multipass
    let multipass = state
        .store
        .get_multipass(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("unknown multipass"))?;
    if multipass.uuid != record.multipass_uuid || !jti_matches(&multipass, &claims.jti) {
        return Err(ApiError::unauthorized("token does not match this server"));
    }

    Ok(Json(record))
}

/// server-access extension configuration payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerAccessConfigPayload {
    /// role granted to servers for ssh access checks.
    pub role_for_ssh_access: String,
    /// roles bound to a server's service account on registration.
    #[serde(default)]
    pub roles_for_servers: Vec<String>,
    /// base uid; allocation starts at this value plus one.
    #[serde(default)]
    pub last_allocated_uid: i64,
    /// seconds before a revealed password seed expires; 0 = never.
    #[serde(default)]
    pub expire_password_seed_after_reveal_in: i64,
    /// seconds after expiry before seeds are deleted; 0 = never.
    #[serde(default)]
    pub delete_expired_password_seeds_after: i64,
}

/// POST /configure_extension/server_access
pub async fn configure_server_access(
    State(state): State<AppState>,
    Json(payload): Json<ServerAccessConfigPayload>,
) -> Result<Json<ServerAccessConfigPayload>, ApiError> {
    if payload.role_for_ssh_access.is_empty() {
        return Err(ApiError::bad_request("role_for_ssh_access must be set"));
    }

    // never move the uid counter backwards
    let last_allocated_uid = match state.store.get_server_access_config().await? {
        Some(existing) => existing.last_allocated_uid.max(payload.last_allocated_uid),
        None => payload.last_allocated_uid,
    };

    let config = ServerAccessConfig {
        role_for_ssh_access: payload.role_for_ssh_access.clone(),
        roles_for_servers: payload.roles_for_servers.clone(),
        last_allocated_uid,
        expire_password_seed_after_reveal_in: payload.expire_password_seed_after_reveal_in,
        delete_expired_password_seeds_after: payload.delete_expired_password_seeds_after,
    };
    state.store.set_server_access_config(&config).await?;

    Ok(Json(ServerAccessConfigPayload {
        last_allocated_uid,
        ..payload
    }))
}

/// response for server-access enrollment; the password seed stays private.
#[derive(Debug, Serialize)]
pub struct EnsureServerAccessResponse {
    /// allocated posix uid.
    pub uid: i64,
}

async fn ensure_access(
    state: &AppState,
    tenant: &str,
    kind: SubjectKind,
    uuid: &str,
) -> Result<Json<EnsureServerAccessResponse>, ApiError> {
    let subject_tenant = match kind {
        SubjectKind::User => state.store.get_user(uuid).await?.map(|u| u.tenant_uuid),
        SubjectKind::ServiceAccount => state
            .store
            .get_service_account(uuid)
            .await?
            .map(|sa| sa.tenant_uuid),
    };
    if subject_tenant.as_deref() != Some(tenant) {
        return Err(ApiError::not_found(format!("subject {}", uuid)));
    }

    let extension = state.store.ensure_server_access(kind, uuid).await?;
    let uid = extension
        .uid
        .ok_or_else(|| ApiError::internal("extension left without uid"))?;
    Ok(Json(EnsureServerAccessResponse { uid }))
}

/// POST /tenant/{tenant}/user/{user}/server_access
pub async fn ensure_user_server_access(
    State(state): State<AppState>,
    Path((tenant, user)): Path<(String, String)>,
) -> Result<Json<EnsureServerAccessResponse>, ApiError> {
    ensure_access(&state, &tenant, SubjectKind::User, &user).await
}

/// POST /tenant/{tenant}/service_account/{service_account}/server_access
pub async fn ensure_service_account_server_access(
    State(state): State<AppState>,
    Path((tenant, sa)): Path<(String, String)>,
) -> Result<Json<EnsureServerAccessResponse>, ApiError> {
    ensure_access(&state, &tenant, SubjectKind::ServiceAccount, &sa).await
}

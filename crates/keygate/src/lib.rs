//! keygate library: http server and application setup.
//!
//! this crate wires the pure resolution core (`keygate-access`) and the
//! database layer (`keygate-store`) into an axum application:
//! - [`handlers`]: http request handlers
//! - [`cli`]: command-line interface implementation
//! - [`signer`]: hmac signing for multipass tokens
//! - [`snapshot`]: directory snapshot loading

#![warn(missing_docs)]

pub mod cli;
/// http request handlers for the keygate api.
pub mod handlers;
/// hmac token signing for multipasses.
pub mod signer;
/// directory snapshot loading.
pub mod snapshot;

use axum::{
    Router,
    routing::{get, post},
};

use keygate_store::KeygateStore;
use keygate_types::Config;
use signer::HmacSigner;

/// shared state for http handlers.
#[derive(Clone)]
pub struct AppState {
    /// database handle.
    pub store: KeygateStore,
    /// server configuration.
    pub config: Config,
}

impl AppState {
    /// build the token signer from the configured secret.
    pub fn signer(&self) -> HmacSigner {
        HmacSigner::new(self.config.token.signing_secret.as_bytes())
    }
}

/// create the axum application with all routes.
pub fn create_app(store: KeygateStore, config: Config) -> Router {
    let state = AppState { store, config };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/query_server", get(handlers::query_servers_global))
        .route(
            "/tenant/{tenant}/query_server",
            get(handlers::query_servers_tenant),
        )
        .route(
            "/tenant/{tenant}/project/{project}/query_server",
            get(handlers::query_servers_project),
        )
        .route(
            "/tenant/{tenant}/project/{project}/server/{server}",
            get(handlers::show_server),
        )
        .route(
            "/tenant/{tenant}/project/{project}/server/{server}/posix_users",
            get(handlers::posix_users),
        )
        .route(
            "/tenant/{tenant}/user/{user}/server_access",
            post(handlers::ensure_user_server_access),
        )
        .route(
            "/tenant/{tenant}/service_account/{service_account}/server_access",
            post(handlers::ensure_service_account_server_access),
        )
        .route(
            "/configure_extension/server_access",
            post(handlers::configure_server_access),
        )
        .route(
            "/check_effective_roles",
            post(handlers::check_effective_roles),
        )
        .route("/multipass/{uuid}/issue", post(handlers::issue_multipass))
        .route(
            "/multipass/{uuid}/prolong",
            post(handlers::prolong_multipass),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use keygate_store::{ServerAccessConfig, Store};
    use keygate_types::{
        BoundRole, Config, ConnectionInfo, Member, Multipass, MultipassOwnerType, Project, Role,
        RoleBinding, RoleScope, Server, Tenant, User,
    };

    use super::*;

    async fn test_app() -> (Router, KeygateStore) {
        let store = KeygateStore::new_in_memory().await.unwrap();
        let mut config = Config::default();
        config.token.signing_secret = "test-secret".to_string();
        let app = create_app(store.clone(), config);
        (app, store)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _store) = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "pass");
    }

    #[tokio::test]
    async fn test_query_server_scope_controls_detail() {
        let (app, store) = test_app().await;
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        let project = store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();
        let mut server = Server::new(tenant.uuid.clone(), project.uuid.clone(), "db-1");
        server.connection_info = ConnectionInfo {
            hostname: "db-1.internal".to_string(),
            port: "22".to_string(),
            ..Default::default()
        };
        store.create_server(&server).await.unwrap();

        // global scope hides connection details
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/query_server")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["servers"][0]["identifier"], "db-1");
        assert_eq!(body["servers"][0]["connection_info"]["hostname"], "");

        // project scope shows them
        let uri = format!(
            "/tenant/{}/project/{}/query_server?names=DB-1",
            tenant.uuid, project.uuid
        );
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["servers"][0]["connection_info"]["hostname"],
            "db-1.internal"
        );
    }

    #[tokio::test]
    async fn test_query_server_names_with_selector_rejected() {
        let (app, store) = test_app().await;
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        let project = store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();

        let uri = format!(
            "/tenant/{}/project/{}/query_server?names=db-1&labelSelector=env%3Dprod",
            tenant.uuid, project.uuid
        );
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_posix_users_end_to_end() {
        let (app, store) = test_app().await;
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        let project = store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();
        let user = store
            .create_user(&User::new(tenant.uuid.clone(), "vasya", "acme"))
            .await
            .unwrap();
        let server = store
            .create_server(&Server::new(
                tenant.uuid.clone(),
                project.uuid.clone(),
                "db-1",
            ))
            .await
            .unwrap();

        store
            .set_server_access_config(&ServerAccessConfig {
                role_for_ssh_access: "ssh.open".to_string(),
                last_allocated_uid: 1999,
                ..Default::default()
            })
            .await
            .unwrap();

        // enroll the user via the api
        let uri = format!("/tenant/{}/user/{}/server_access", tenant.uuid, user.uuid);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["uid"], 2000);

        let uri = format!(
            "/tenant/{}/project/{}/server/{}/posix_users",
            tenant.uuid, project.uuid, server.uuid
        );
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["posix_users"][0]["name"], "vasya");
        assert_eq!(body["posix_users"][0]["uid"], 2000);
        assert_eq!(body["posix_users"][0]["home_dir"], "/home/vasya");
        assert!(
            body["posix_users"][0]["password"]
                .as_str()
                .unwrap()
                .starts_with("$6$")
        );
    }

    #[tokio::test]
    async fn test_check_effective_roles() {
        let (app, store) = test_app().await;
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();
        let user = store
            .create_user(&User::new(tenant.uuid.clone(), "vasya", "acme"))
            .await
            .unwrap();
        store
            .create_role(&Role::new("ssh.open", RoleScope::Project))
            .await
            .unwrap();

        let mut binding = RoleBinding::new(tenant.uuid.clone(), "rb1");
        binding.members.push(Member::user(user.uuid.clone()));
        binding.roles.push(BoundRole::new("ssh.open"));
        binding.any_project = true;
        store.create_role_binding(&binding).await.unwrap();

        let request_body = serde_json::json!({
            "subject": { "kind": "user", "uuid": user.uuid },
            "roles": ["ssh.open", "missing.role"],
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/check_effective_roles")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        assert_eq!(body["effective_roles"][0]["role"], "ssh.open");
        assert_eq!(body["effective_roles"][0]["tenants"][0]["uuid"], tenant.uuid);
        assert_eq!(
            body["effective_roles"][0]["tenants"][0]["projects"]
                .as_array()
                .unwrap()
                .len(),
            1
        );
        // unknown role resolves to an empty entry plus a warning
        assert_eq!(body["effective_roles"][1]["role"], "missing.role");
        assert!(
            body["effective_roles"][1]["tenants"]
                .as_array()
                .unwrap()
                .is_empty()
        );
        assert_eq!(body["warnings"][0], "role \"missing.role\" not found");
    }

    #[tokio::test]
    async fn test_show_server_requires_matching_multipass_token() {
        let (app, store) = test_app().await;
        let tenant = store.create_tenant(&Tenant::new("acme")).await.unwrap();
        let project = store
            .create_project(&Project::new(tenant.uuid.clone(), "web"))
            .await
            .unwrap();
        let sa = store
            .create_service_account(&keygate_types::ServiceAccount::new(
                tenant.uuid.clone(),
                "db-1",
                "acme",
            ))
            .await
            .unwrap();

        let multipass = store
            .create_multipass(&Multipass::new(
                tenant.uuid.clone(),
                MultipassOwnerType::ServiceAccount,
                sa.uuid.clone(),
                3600,
                86400,
                chrono::Utc::now().timestamp() + 86400,
            ))
            .await
            .unwrap();

        let mut server = Server::new(tenant.uuid.clone(), project.uuid.clone(), "db-1");
        server.multipass_uuid = multipass.uuid.clone();
        server.fingerprint = "SHA256:abcdef".to_string();
        let server = store.create_server(&server).await.unwrap();

        let server_uri = format!(
            "/tenant/{}/project/{}/server/{}",
            tenant.uuid, project.uuid, server.uuid
        );

        // no token
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(&server_uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // issue a token through the api
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/multipass/{}/issue", multipass.uuid))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(&server_uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fingerprint"], "SHA256:abcdef");

        // reissue rotates the salt; the old token stops working
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/multipass/{}/issue", multipass.uuid))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&server_uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_configure_extension_keeps_uid_counter_monotonic() {
        let (app, store) = test_app().await;
        store
            .set_server_access_config(&ServerAccessConfig {
                role_for_ssh_access: "ssh.open".to_string(),
                last_allocated_uid: 5000,
                ..Default::default()
            })
            .await
            .unwrap();

        let request_body = serde_json::json!({
            "role_for_ssh_access": "ssh.open",
            "last_allocated_uid": 2000,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/configure_extension/server_access")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["last_allocated_uid"], 5000);
    }
}

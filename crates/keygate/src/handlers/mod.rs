//! http handlers for keygate api endpoints.

mod authz;
mod error;
mod health;
mod multipass;
mod server_access;

pub use authz::{CheckEffectiveRolesRequest, CheckEffectiveRolesResponse, check_effective_roles};
pub use error::ApiError;
pub use health::health;
pub use multipass::{MultipassTokenResponse, issue_multipass, prolong_multipass};
pub use server_access::{
    PosixUsersResponse, QueryServerResponse, ServerAccessConfigPayload, configure_server_access,
    ensure_service_account_server_access, ensure_user_server_access, posix_users,
    query_servers_global, query_servers_project, query_servers_tenant, show_server,
};

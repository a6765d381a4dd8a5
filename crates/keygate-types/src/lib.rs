//! shared domain types for keygate.
//!
//! every record kind of the entity store lives here, plus the pieces of
//! state that travel between the store, the resolution core and the http
//! surface: archive marks, the typed server-access extension, role option
//! schemas and the server configuration.

#![warn(missing_docs)]

mod archive;
mod binding;
mod config;
mod group;
mod multipass;
mod project;
mod role;
mod server;
mod sharing;
mod subject;
mod tenant;

pub use archive::ArchiveMark;
pub use binding::{BoundRole, Member, MemberKind, RoleBinding, RoleBindingApproval};
pub use config::{Config, DatabaseConfig, TokenConfig};
pub use group::Group;
pub use multipass::{Multipass, MultipassOwnerType};
pub use project::Project;
pub use role::{IncludedRole, OptionSchemaProperty, OptionType, OptionsSchema, Role, RoleScope};
pub use server::{ConnectionInfo, Server};
pub use sharing::IdentitySharing;
pub use subject::{
    PasswordEntry, ServerAccessExtension, ServiceAccount, SubjectKind, SubjectRef, User,
};
pub use tenant::Tenant;

/// uuid of a tenant.
pub type TenantUuid = String;
/// uuid of a project.
pub type ProjectUuid = String;
/// uuid of a user.
pub type UserUuid = String;
/// uuid of a service account.
pub type ServiceAccountUuid = String;
/// uuid of a group.
pub type GroupUuid = String;
/// uuid of a role binding.
pub type RoleBindingUuid = String;
/// uuid of a server.
pub type ServerUuid = String;
/// uuid of a multipass.
pub type MultipassUuid = String;
/// global role name (e.g. "ssh.open").
pub type RoleName = String;

/// generate a fresh opaque resource version.
///
/// versions are compared for equality only; a mismatch on update/delete is
/// an optimistic-concurrency conflict.
pub fn new_resource_version() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// generate a fresh entity uuid.
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_versions_are_unique() {
        assert_ne!(new_resource_version(), new_resource_version());
    }
}

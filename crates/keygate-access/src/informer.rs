//! read-side view of the directory used by resolution.
//!
//! the resolver never talks to storage directly. it reads through the
//! [`Directory`] trait, and callers hand it a [`SnapshotCatalog`] built
//! from whatever source they have (the sql store, a fixture, a cache).

use std::collections::HashMap;

use keygate_types::{
    Group, IdentitySharing, Project, Role, RoleBinding, Server, ServiceAccount, Tenant, User,
};

/// a point-in-time read view of the directory.
///
/// lookups return archived entities too; resolution code checks archive
/// marks itself so that warnings can distinguish "missing" from
/// "archived". listing methods must be deterministic: the snapshot's
/// insertion order is the iteration order.
pub trait Directory {
    /// look up a tenant by uuid.
    fn tenant(&self, uuid: &str) -> Option<&Tenant>;

    /// all tenants in insertion order.
    fn tenants(&self) -> &[Tenant];

    /// look up a project by uuid.
    fn project(&self, uuid: &str) -> Option<&Project>;

    /// active projects of a tenant in insertion order.
    fn projects_of_tenant(&self, tenant_uuid: &str) -> Vec<&Project>;

    /// look up a user by uuid.
    fn user(&self, uuid: &str) -> Option<&User>;

    /// look up a service account by uuid.
    fn service_account(&self, uuid: &str) -> Option<&ServiceAccount>;

    /// users of a tenant in insertion order.
    fn users_of_tenant(&self, tenant_uuid: &str) -> Vec<&User>;

    /// service accounts of a tenant in insertion order.
    fn service_accounts_of_tenant(&self, tenant_uuid: &str) -> Vec<&ServiceAccount>;

    /// look up a group by uuid.
    fn group(&self, uuid: &str) -> Option<&Group>;

    /// all groups in insertion order.
    fn groups(&self) -> &[Group];

    /// sharings whose destination is the given tenant.
    fn sharings_into_tenant(&self, tenant_uuid: &str) -> Vec<&IdentitySharing>;

    /// look up a role by name.
    fn role(&self, name: &str) -> Option<&Role>;

    /// all roles in insertion order.
    fn roles(&self) -> &[Role];

    /// role bindings of a tenant in insertion order.
    fn bindings_of_tenant(&self, tenant_uuid: &str) -> Vec<&RoleBinding>;

    /// all servers in insertion order.
    fn servers(&self) -> &[Server];

    /// look up a server by uuid.
    fn server(&self, uuid: &str) -> Option<&Server>;
}

/// map-backed [`Directory`] built by inserting entities one by one.
///
/// entities live in insertion-ordered vecs with uuid indexes on the
/// side, so listing order is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    tenants: Vec<Tenant>,
    tenant_index: HashMap<String, usize>,

    projects: Vec<Project>,
    project_index: HashMap<String, usize>,

    users: Vec<User>,
    user_index: HashMap<String, usize>,

    service_accounts: Vec<ServiceAccount>,
    service_account_index: HashMap<String, usize>,

    groups: Vec<Group>,
    group_index: HashMap<String, usize>,

    sharings: Vec<IdentitySharing>,

    roles: Vec<Role>,
    role_index: HashMap<String, usize>,

    bindings: Vec<RoleBinding>,

    servers: Vec<Server>,
    server_index: HashMap<String, usize>,
}

impl SnapshotCatalog {
    /// create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// add a tenant to the snapshot.
    pub fn add_tenant(&mut self, tenant: Tenant) {
        self.tenant_index
            .insert(tenant.uuid.clone(), self.tenants.len());
        self.tenants.push(tenant);
    }

    /// add a project to the snapshot.
    pub fn add_project(&mut self, project: Project) {
        self.project_index
            .insert(project.uuid.clone(), self.projects.len());
        self.projects.push(project);
    }

    /// add a user to the snapshot.
    pub fn add_user(&mut self, user: User) {
        self.user_index.insert(user.uuid.clone(), self.users.len());
        self.users.push(user);
    }

    /// add a service account to the snapshot.
    pub fn add_service_account(&mut self, sa: ServiceAccount) {
        self.service_account_index
            .insert(sa.uuid.clone(), self.service_accounts.len());
        self.service_accounts.push(sa);
    }

    /// add a group to the snapshot.
    pub fn add_group(&mut self, group: Group) {
        self.group_index
            .insert(group.uuid.clone(), self.groups.len());
        self.groups.push(group);
    }

    /// add an identity sharing to the snapshot.
    pub fn add_sharing(&mut self, sharing: IdentitySharing) {
        self.sharings.push(sharing);
    }

    /// add a role to the snapshot.
    pub fn add_role(&mut self, role: Role) {
        self.role_index.insert(role.name.clone(), self.roles.len());
        self.roles.push(role);
    }

    /// add a role binding to the snapshot.
    pub fn add_binding(&mut self, binding: RoleBinding) {
        self.bindings.push(binding);
    }

    /// add a server to the snapshot.
    pub fn add_server(&mut self, server: Server) {
        self.server_index
            .insert(server.uuid.clone(), self.servers.len());
        self.servers.push(server);
    }
}

impl Directory for SnapshotCatalog {
    fn tenant(&self, uuid: &str) -> Option<&Tenant> {
        self.tenant_index.get(uuid).map(|&i| &self.tenants[i])
    }

    fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    fn project(&self, uuid: &str) -> Option<&Project> {
        self.project_index.get(uuid).map(|&i| &self.projects[i])
    }

    fn projects_of_tenant(&self, tenant_uuid: &str) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.tenant_uuid == tenant_uuid && p.archive_mark.is_active())
            .collect()
    }

    fn user(&self, uuid: &str) -> Option<&User> {
        self.user_index.get(uuid).map(|&i| &self.users[i])
    }

    fn service_account(&self, uuid: &str) -> Option<&ServiceAccount> {
        self.service_account_index
            .get(uuid)
            .map(|&i| &self.service_accounts[i])
    }

    fn users_of_tenant(&self, tenant_uuid: &str) -> Vec<&User> {
        self.users
            .iter()
            .filter(|u| u.tenant_uuid == tenant_uuid)
            .collect()
    }

    fn service_accounts_of_tenant(&self, tenant_uuid: &str) -> Vec<&ServiceAccount> {
        self.service_accounts
            .iter()
            .filter(|sa| sa.tenant_uuid == tenant_uuid)
            .collect()
    }

    fn group(&self, uuid: &str) -> Option<&Group> {
        self.group_index.get(uuid).map(|&i| &self.groups[i])
    }

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn sharings_into_tenant(&self, tenant_uuid: &str) -> Vec<&IdentitySharing> {
        self.sharings
            .iter()
            .filter(|s| s.destination_tenant_uuid == tenant_uuid && s.archive_mark.is_active())
            .collect()
    }

    fn role(&self, name: &str) -> Option<&Role> {
        self.role_index.get(name).map(|&i| &self.roles[i])
    }

    fn roles(&self) -> &[Role] {
        &self.roles
    }

    fn bindings_of_tenant(&self, tenant_uuid: &str) -> Vec<&RoleBinding> {
        self.bindings
            .iter()
            .filter(|b| b.tenant_uuid == tenant_uuid)
            .collect()
    }

    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn server(&self, uuid: &str) -> Option<&Server> {
        self.server_index.get(uuid).map(|&i| &self.servers[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_listing_order() {
        let mut catalog = SnapshotCatalog::new();
        let t1 = Tenant::new("acme");
        let t2 = Tenant::new("globex");
        catalog.add_tenant(t1.clone());
        catalog.add_tenant(t2.clone());

        let uuids: Vec<_> = catalog.tenants().iter().map(|t| &t.uuid).collect();
        assert_eq!(uuids, vec![&t1.uuid, &t2.uuid]);
        assert_eq!(catalog.tenant(&t2.uuid).unwrap().identifier, "globex");
    }

    #[test]
    fn test_archived_projects_hidden_from_tenant_listing() {
        let mut catalog = SnapshotCatalog::new();
        let tenant = Tenant::new("acme");
        let live = Project::new(tenant.uuid.clone(), "web");
        let mut dead = Project::new(tenant.uuid.clone(), "legacy");
        dead.archive_mark = keygate_types::ArchiveMark::new(1_700_000_000, 7);

        catalog.add_project(live.clone());
        catalog.add_project(dead.clone());

        let listed = catalog.projects_of_tenant(&tenant.uuid);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uuid, live.uuid);
        // direct lookup still finds the archived record
        assert!(catalog.project(&dead.uuid).is_some());
    }
}

//! database layer for keygate.
//!
//! this crate provides persistent storage for:
//! - Tenants and projects
//! - Users, service accounts and groups
//! - Identity sharings
//! - Roles, role bindings and approvals
//! - Servers and multipasses
//!
//! it also owns posix uid allocation for the server-access extension.
//! all mutations use archive (soft-delete) semantics: records are marked
//! with an archiving timestamp and hash rather than being removed, and a
//! stale resource version is rejected as a conflict.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use keygate_access::SnapshotCatalog;
use keygate_types::{
    ArchiveMark, Group, IdentitySharing, Multipass, PasswordEntry, Project, Role, RoleBinding,
    RoleBindingApproval, Server, ServerAccessExtension, ServiceAccount, SubjectKind, Tenant,
    User, new_resource_version,
};

/// server-access extension configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerAccessConfig {
    /// role granted to registered servers for ssh access checks.
    pub role_for_ssh_access: String,
    /// roles bound to a server's own service account on registration.
    pub roles_for_servers: Vec<String>,
    /// highest posix uid handed out so far.
    pub last_allocated_uid: i64,
    /// seconds after a reveal before a password seed expires; 0 = never.
    pub expire_password_seed_after_reveal_in: i64,
    /// seconds after expiry before stale seeds are deleted; 0 = never.
    pub delete_expired_password_seeds_after: i64,
}

impl From<entity::server_access_config::Model> for ServerAccessConfig {
    fn from(model: entity::server_access_config::Model) -> Self {
        Self {
            role_for_ssh_access: model.role_for_ssh_access,
            roles_for_servers: model
                .roles_for_servers
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default(),
            last_allocated_uid: model.last_allocated_uid,
            expire_password_seed_after_reveal_in: model.expire_password_seed_after_reveal_in,
            delete_expired_password_seeds_after: model.delete_expired_password_seeds_after,
        }
    }
}

impl From<&ServerAccessConfig> for entity::server_access_config::ActiveModel {
    fn from(config: &ServerAccessConfig) -> Self {
        Self {
            id: Set(1),
            role_for_ssh_access: Set(config.role_for_ssh_access.clone()),
            roles_for_servers: Set(if config.roles_for_servers.is_empty() {
                None
            } else {
                serde_json::to_string(&config.roles_for_servers).ok()
            }),
            last_allocated_uid: Set(config.last_allocated_uid),
            expire_password_seed_after_reveal_in: Set(config
                .expire_password_seed_after_reveal_in),
            delete_expired_password_seeds_after: Set(config.delete_expired_password_seeds_after),
        }
    }
}

/// result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// storage trait for keygate.
///
/// abstracts over database backends (sqlite, postgresql). reads return
/// archived records too, so callers can distinguish "archived" from
/// "never existed"; list operations hide archived records unless
/// `show_archived` is set.
pub trait Store: Send + Sync {
    /// ping the database to verify connectivity.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // tenants

    /// create a tenant. fails if an active tenant holds the identifier.
    fn create_tenant(&self, tenant: &Tenant) -> impl Future<Output = Result<Tenant>> + Send;

    /// get a tenant by uuid, archived or not.
    fn get_tenant(&self, uuid: &str) -> impl Future<Output = Result<Option<Tenant>>> + Send;

    /// list tenants.
    fn list_tenants(&self, show_archived: bool)
    -> impl Future<Output = Result<Vec<Tenant>>> + Send;

    /// update a tenant; the supplied version must match the stored one.
    fn update_tenant(&self, tenant: &Tenant) -> impl Future<Output = Result<Tenant>> + Send;

    /// archive a tenant and everything it owns under one cascade mark.
    fn archive_tenant(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // projects

    /// create a project under an active tenant.
    fn create_project(&self, project: &Project) -> impl Future<Output = Result<Project>> + Send;

    /// get a project by uuid.
    fn get_project(&self, uuid: &str) -> impl Future<Output = Result<Option<Project>>> + Send;

    /// list projects of a tenant.
    fn list_projects(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<Project>>> + Send;

    /// update a project.
    fn update_project(&self, project: &Project) -> impl Future<Output = Result<Project>> + Send;

    /// archive a project and its servers.
    fn archive_project(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    /// restore an archived project (its servers stay archived).
    fn restore_project(&self, uuid: &str) -> impl Future<Output = Result<Project>> + Send;

    // users

    /// create a user.
    fn create_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// get a user by uuid.
    fn get_user(&self, uuid: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// list users of a tenant.
    fn list_users(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// update a user.
    fn update_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// archive a user.
    fn archive_user(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // service accounts

    /// create a service account.
    fn create_service_account(
        &self,
        sa: &ServiceAccount,
    ) -> impl Future<Output = Result<ServiceAccount>> + Send;

    /// get a service account by uuid.
    fn get_service_account(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<ServiceAccount>>> + Send;

    /// list service accounts of a tenant.
    fn list_service_accounts(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<ServiceAccount>>> + Send;

    /// update a service account.
    fn update_service_account(
        &self,
        sa: &ServiceAccount,
    ) -> impl Future<Output = Result<ServiceAccount>> + Send;

    /// archive a service account.
    fn archive_service_account(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // groups

    /// create a group.
    fn create_group(&self, group: &Group) -> impl Future<Output = Result<Group>> + Send;

    /// get a group by uuid.
    fn get_group(&self, uuid: &str) -> impl Future<Output = Result<Option<Group>>> + Send;

    /// list groups of a tenant.
    fn list_groups(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<Group>>> + Send;

    /// update a group.
    fn update_group(&self, group: &Group) -> impl Future<Output = Result<Group>> + Send;

    /// archive a group.
    fn archive_group(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // identity sharings

    /// create an identity sharing.
    fn create_sharing(
        &self,
        sharing: &IdentitySharing,
    ) -> impl Future<Output = Result<IdentitySharing>> + Send;

    /// list sharings whose destination is the given tenant.
    fn list_sharings_into(
        &self,
        tenant_uuid: &str,
    ) -> impl Future<Output = Result<Vec<IdentitySharing>>> + Send;

    /// archive an identity sharing.
    fn archive_sharing(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // roles

    /// create a role.
    fn create_role(&self, role: &Role) -> impl Future<Output = Result<Role>> + Send;

    /// get a role by name.
    fn get_role(&self, name: &str) -> impl Future<Output = Result<Option<Role>>> + Send;

    /// list roles.
    fn list_roles(&self, show_archived: bool) -> impl Future<Output = Result<Vec<Role>>> + Send;

    /// update a role; the new options schema must be backwards compatible.
    fn update_role(&self, role: &Role) -> impl Future<Output = Result<Role>> + Send;

    /// archive a role. inclusion edges pointing at it become dangling.
    fn archive_role(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    // role bindings

    /// create a role binding. validates every bound role's options.
    fn create_role_binding(
        &self,
        binding: &RoleBinding,
    ) -> impl Future<Output = Result<RoleBinding>> + Send;

    /// get a role binding by uuid.
    fn get_role_binding(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<RoleBinding>>> + Send;

    /// list role bindings of a tenant.
    fn list_role_bindings(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<RoleBinding>>> + Send;

    /// update a role binding. validates every bound role's options.
    fn update_role_binding(
        &self,
        binding: &RoleBinding,
    ) -> impl Future<Output = Result<RoleBinding>> + Send;

    /// archive a role binding and its approvals.
    fn archive_role_binding(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // role binding approvals

    /// create an approval for a binding.
    fn create_approval(
        &self,
        approval: &RoleBindingApproval,
    ) -> impl Future<Output = Result<RoleBindingApproval>> + Send;

    /// list approvals of a binding.
    fn list_approvals(
        &self,
        role_binding_uuid: &str,
    ) -> impl Future<Output = Result<Vec<RoleBindingApproval>>> + Send;

    /// archive an approval.
    fn archive_approval(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // servers

    /// create a server.
    fn create_server(&self, server: &Server) -> impl Future<Output = Result<Server>> + Send;

    /// get a server by uuid.
    fn get_server(&self, uuid: &str) -> impl Future<Output = Result<Option<Server>>> + Send;

    /// list servers of a tenant.
    fn list_servers(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> impl Future<Output = Result<Vec<Server>>> + Send;

    /// update a server.
    fn update_server(&self, server: &Server) -> impl Future<Output = Result<Server>> + Send;

    /// archive a server.
    fn archive_server(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // multipasses

    /// create a multipass.
    fn create_multipass(
        &self,
        multipass: &Multipass,
    ) -> impl Future<Output = Result<Multipass>> + Send;

    /// get a multipass by uuid.
    fn get_multipass(&self, uuid: &str)
    -> impl Future<Output = Result<Option<Multipass>>> + Send;

    /// list multipasses of an owner.
    fn list_multipasses(
        &self,
        owner_uuid: &str,
    ) -> impl Future<Output = Result<Vec<Multipass>>> + Send;

    /// update a multipass (salt rotation after issue/prolong).
    fn update_multipass(
        &self,
        multipass: &Multipass,
    ) -> impl Future<Output = Result<Multipass>> + Send;

    /// archive a multipass.
    fn archive_multipass(&self, uuid: &str) -> impl Future<Output = Result<()>> + Send;

    // server-access extension

    /// get the server-access configuration, if set.
    fn get_server_access_config(
        &self,
    ) -> impl Future<Output = Result<Option<ServerAccessConfig>>> + Send;

    /// set (upsert) the server-access configuration.
    fn set_server_access_config(
        &self,
        config: &ServerAccessConfig,
    ) -> impl Future<Output = Result<()>> + Send;

    /// ensure a subject carries a populated server-access extension.
    ///
    /// allocates the next posix uid and a first password entry when the
    /// extension is empty; already-populated extensions are returned
    /// unchanged, so the call is idempotent.
    fn ensure_server_access(
        &self,
        kind: SubjectKind,
        uuid: &str,
    ) -> impl Future<Output = Result<ServerAccessExtension>> + Send;
}

/// the main store implementation using sea-orm.
#[derive(Clone)]
pub struct KeygateStore {
    conn: DatabaseConnection,
}

fn fresh_mark() -> ArchiveMark {
    ArchiveMark::new(Utc::now().timestamp(), rand::random::<u32>() as i64)
}

// crypt(3) salt alphabet
const SALT_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789./";

fn new_password_entry(expire_in: i64) -> PasswordEntry {
    let mut rng = rand::thread_rng();
    let seed: Vec<u8> = (0..64).map(|_| rng.r#gen::<u8>()).collect();
    let salt: String = (0..8)
        .map(|_| SALT_CHARS[rng.gen_range(0..SALT_CHARS.len())] as char)
        .collect();
    let valid_till = if expire_in > 0 {
        Utc::now().timestamp() + expire_in
    } else {
        0
    };
    PasswordEntry {
        seed,
        salt,
        valid_till,
    }
}

impl KeygateStore {
    /// create a new store from config.
    pub async fn new(config: &keygate_types::DatabaseConfig) -> Result<Self> {
        let url = Self::build_connection_url(config)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let store = Self { conn };
        store.migrate().await?;
        Ok(store)
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &keygate_types::DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // add ?mode=rwc to create the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => Ok(config.connection_string.clone()),
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite store for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let store = Self { conn };
        store.migrate().await?;
        Ok(store)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    // load just enough of the directory to validate a binding's roles
    async fn role_validation_catalog(&self, tenant_uuid: &str) -> Result<(SnapshotCatalog, Tenant)> {
        let tenant = self
            .get_tenant(tenant_uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", tenant_uuid)))?;
        if tenant.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("tenant {}", tenant_uuid)));
        }

        let mut catalog = SnapshotCatalog::new();
        for role in self.list_roles(false).await? {
            catalog.add_role(role);
        }
        Ok((catalog, tenant))
    }
}

impl Store for KeygateStore {
    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // tenants

    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant> {
        let existing = entity::tenant::Entity::find()
            .filter(entity::tenant::Column::Identifier.eq(&tenant.identifier))
            .filter(entity::tenant::Column::ArchivingTimestamp.eq(0))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists(format!(
                "tenant {}",
                tenant.identifier
            )));
        }

        let model: entity::tenant::ActiveModel = tenant.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_tenant(&self, uuid: &str) -> Result<Option<Tenant>> {
        let result = entity::tenant::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_tenants(&self, show_archived: bool) -> Result<Vec<Tenant>> {
        let mut query = entity::tenant::Entity::find();
        if !show_archived {
            query = query.filter(entity::tenant::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_tenant(&self, tenant: &Tenant) -> Result<Tenant> {
        let current = self
            .get_tenant(&tenant.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", tenant.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("tenant {}", tenant.uuid)));
        }
        if current.version != tenant.version {
            return Err(Error::Conflict(format!("tenant {}", tenant.uuid)));
        }

        let mut updated = tenant.clone();
        updated.version = new_resource_version();
        let model: entity::tenant::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_tenant(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_tenant(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("tenant {}", uuid)));
        }

        let mark = fresh_mark();
        let mut archived = current;
        archived.archive_mark = mark;
        archived.version = new_resource_version();
        let model: entity::tenant::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;

        use sea_orm::sea_query::Expr;
        macro_rules! cascade {
            ($entity:ident, $col:ident) => {
                entity::$entity::Entity::update_many()
                    .col_expr(
                        entity::$entity::Column::ArchivingTimestamp,
                        Expr::value(mark.timestamp),
                    )
                    .col_expr(
                        entity::$entity::Column::ArchivingHash,
                        Expr::value(mark.hash),
                    )
                    .filter(entity::$entity::Column::$col.eq(uuid))
                    .filter(entity::$entity::Column::ArchivingTimestamp.eq(0))
                    .exec(&self.conn)
                    .await?;
            };
        }
        cascade!(project, TenantUuid);
        cascade!(user, TenantUuid);
        cascade!(service_account, TenantUuid);
        cascade!(group, TenantUuid);
        cascade!(role_binding, TenantUuid);
        cascade!(role_binding_approval, TenantUuid);
        cascade!(server, TenantUuid);
        cascade!(multipass, TenantUuid);
        cascade!(identity_sharing, SourceTenantUuid);
        cascade!(identity_sharing, DestinationTenantUuid);

        tracing::info!(tenant = %uuid, "tenant archived");
        Ok(())
    }

    // projects

    async fn create_project(&self, project: &Project) -> Result<Project> {
        let tenant = self
            .get_tenant(&project.tenant_uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", project.tenant_uuid)))?;
        if tenant.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "tenant {}",
                project.tenant_uuid
            )));
        }

        let model: entity::project::ActiveModel = project.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_project(&self, uuid: &str) -> Result<Option<Project>> {
        let result = entity::project::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_projects(&self, tenant_uuid: &str, show_archived: bool) -> Result<Vec<Project>> {
        let mut query = entity::project::Entity::find()
            .filter(entity::project::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::project::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_project(&self, project: &Project) -> Result<Project> {
        let current = self
            .get_project(&project.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("project {}", project.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("project {}", project.uuid)));
        }
        if current.version != project.version {
            return Err(Error::Conflict(format!("project {}", project.uuid)));
        }

        let mut updated = project.clone();
        updated.version = new_resource_version();
        let model: entity::project::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_project(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_project(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("project {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("project {}", uuid)));
        }

        let mark = fresh_mark();
        let mut archived = current;
        archived.archive_mark = mark;
        archived.version = new_resource_version();
        let model: entity::project::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;

        use sea_orm::sea_query::Expr;
        entity::server::Entity::update_many()
            .col_expr(
                entity::server::Column::ArchivingTimestamp,
                Expr::value(mark.timestamp),
            )
            .col_expr(entity::server::Column::ArchivingHash, Expr::value(mark.hash))
            .filter(entity::server::Column::ProjectUuid.eq(uuid))
            .filter(entity::server::Column::ArchivingTimestamp.eq(0))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    async fn restore_project(&self, uuid: &str) -> Result<Project> {
        let current = self
            .get_project(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("project {}", uuid)))?;
        if current.archive_mark.is_active() {
            return Err(Error::InvalidData(format!(
                "project {} is not archived",
                uuid
            )));
        }

        let tenant = self
            .get_tenant(&current.tenant_uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", current.tenant_uuid)))?;
        if tenant.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "tenant {}",
                current.tenant_uuid
            )));
        }

        let mut restored = current;
        restored.archive_mark = ArchiveMark::ACTIVE;
        restored.version = new_resource_version();
        let model: entity::project::ActiveModel = (&restored).into();
        model.update(&self.conn).await?;
        Ok(restored)
    }

    // users

    async fn create_user(&self, user: &User) -> Result<User> {
        let model: entity::user::ActiveModel = user.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_user(&self, uuid: &str) -> Result<Option<User>> {
        let result = entity::user::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_users(&self, tenant_uuid: &str, show_archived: bool) -> Result<Vec<User>> {
        let mut query =
            entity::user::Entity::find().filter(entity::user::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::user::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let current = self
            .get_user(&user.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", user.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("user {}", user.uuid)));
        }
        if current.version != user.version {
            return Err(Error::Conflict(format!("user {}", user.uuid)));
        }

        let mut updated = user.clone();
        updated.version = new_resource_version();
        let model: entity::user::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_user(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_user(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("user {}", uuid)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::user::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // service accounts

    async fn create_service_account(&self, sa: &ServiceAccount) -> Result<ServiceAccount> {
        let model: entity::service_account::ActiveModel = sa.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_service_account(&self, uuid: &str) -> Result<Option<ServiceAccount>> {
        let result = entity::service_account::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_service_accounts(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> Result<Vec<ServiceAccount>> {
        let mut query = entity::service_account::Entity::find()
            .filter(entity::service_account::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::service_account::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_service_account(&self, sa: &ServiceAccount) -> Result<ServiceAccount> {
        let current = self
            .get_service_account(&sa.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("service account {}", sa.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "service account {}",
                sa.uuid
            )));
        }
        if current.version != sa.version {
            return Err(Error::Conflict(format!("service account {}", sa.uuid)));
        }

        let mut updated = sa.clone();
        updated.version = new_resource_version();
        let model: entity::service_account::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_service_account(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_service_account(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("service account {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("service account {}", uuid)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::service_account::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // groups

    async fn create_group(&self, group: &Group) -> Result<Group> {
        let model: entity::group::ActiveModel = group.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_group(&self, uuid: &str) -> Result<Option<Group>> {
        let result = entity::group::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_groups(&self, tenant_uuid: &str, show_archived: bool) -> Result<Vec<Group>> {
        let mut query = entity::group::Entity::find()
            .filter(entity::group::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::group::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_group(&self, group: &Group) -> Result<Group> {
        let current = self
            .get_group(&group.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("group {}", group.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("group {}", group.uuid)));
        }
        if current.version != group.version {
            return Err(Error::Conflict(format!("group {}", group.uuid)));
        }

        let mut updated = group.clone();
        updated.version = new_resource_version();
        let model: entity::group::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_group(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_group(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("group {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("group {}", uuid)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::group::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // identity sharings

    async fn create_sharing(&self, sharing: &IdentitySharing) -> Result<IdentitySharing> {
        let model: entity::identity_sharing::ActiveModel = sharing.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_sharings_into(&self, tenant_uuid: &str) -> Result<Vec<IdentitySharing>> {
        let results = entity::identity_sharing::Entity::find()
            .filter(entity::identity_sharing::Column::DestinationTenantUuid.eq(tenant_uuid))
            .filter(entity::identity_sharing::Column::ArchivingTimestamp.eq(0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn archive_sharing(&self, uuid: &str) -> Result<()> {
        let result = entity::identity_sharing::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?
            .ok_or_else(|| Error::NotFound(format!("sharing {}", uuid)))?;
        let mut sharing: IdentitySharing = result.into();
        if sharing.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("sharing {}", uuid)));
        }

        sharing.archive_mark = fresh_mark();
        sharing.version = new_resource_version();
        let model: entity::identity_sharing::ActiveModel = (&sharing).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // roles

    async fn create_role(&self, role: &Role) -> Result<Role> {
        if self.get_role(&role.name).await?.is_some() {
            return Err(Error::AlreadyExists(format!("role {}", role.name)));
        }
        let model: entity::role::ActiveModel = role.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_role(&self, name: &str) -> Result<Option<Role>> {
        let result = entity::role::Entity::find_by_id(name.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_roles(&self, show_archived: bool) -> Result<Vec<Role>> {
        let mut query = entity::role::Entity::find();
        if !show_archived {
            query = query.filter(entity::role::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_role(&self, role: &Role) -> Result<Role> {
        let current = self
            .get_role(&role.name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("role {}", role.name)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("role {}", role.name)));
        }
        if current.version != role.version {
            return Err(Error::Conflict(format!("role {}", role.name)));
        }

        keygate_access::roles::check_backwards_compatible(
            &current.options_schema,
            &role.options_schema,
        )
        .map_err(keygate_access::Error::SchemaCompat)?;

        let mut updated = role.clone();
        updated.version = new_resource_version();
        let model: entity::role::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_role(&self, name: &str) -> Result<()> {
        let current = self
            .get_role(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("role {}", name)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("role {}", name)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::role::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // role bindings

    async fn create_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        let (catalog, tenant) = self.role_validation_catalog(&binding.tenant_uuid).await?;
        keygate_access::roles::validate_bound_roles(&catalog, &tenant, &binding.roles)?;

        let model: entity::role_binding::ActiveModel = binding.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_role_binding(&self, uuid: &str) -> Result<Option<RoleBinding>> {
        let result = entity::role_binding::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_role_bindings(
        &self,
        tenant_uuid: &str,
        show_archived: bool,
    ) -> Result<Vec<RoleBinding>> {
        let mut query = entity::role_binding::Entity::find()
            .filter(entity::role_binding::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::role_binding::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_role_binding(&self, binding: &RoleBinding) -> Result<RoleBinding> {
        let current = self
            .get_role_binding(&binding.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("role binding {}", binding.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "role binding {}",
                binding.uuid
            )));
        }
        if current.version != binding.version {
            return Err(Error::Conflict(format!("role binding {}", binding.uuid)));
        }

        let (catalog, tenant) = self.role_validation_catalog(&binding.tenant_uuid).await?;
        keygate_access::roles::validate_bound_roles(&catalog, &tenant, &binding.roles)?;

        let mut updated = binding.clone();
        updated.version = new_resource_version();
        let model: entity::role_binding::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_role_binding(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_role_binding(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("role binding {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("role binding {}", uuid)));
        }

        let mark = fresh_mark();
        let mut archived = current;
        archived.archive_mark = mark;
        archived.version = new_resource_version();
        let model: entity::role_binding::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;

        use sea_orm::sea_query::Expr;
        entity::role_binding_approval::Entity::update_many()
            .col_expr(
                entity::role_binding_approval::Column::ArchivingTimestamp,
                Expr::value(mark.timestamp),
            )
            .col_expr(
                entity::role_binding_approval::Column::ArchivingHash,
                Expr::value(mark.hash),
            )
            .filter(entity::role_binding_approval::Column::RoleBindingUuid.eq(uuid))
            .filter(entity::role_binding_approval::Column::ArchivingTimestamp.eq(0))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    // role binding approvals

    async fn create_approval(&self, approval: &RoleBindingApproval) -> Result<RoleBindingApproval> {
        let binding = self
            .get_role_binding(&approval.role_binding_uuid)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("role binding {}", approval.role_binding_uuid))
            })?;
        if binding.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "role binding {}",
                approval.role_binding_uuid
            )));
        }

        let model: entity::role_binding_approval::ActiveModel = approval.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_approvals(&self, role_binding_uuid: &str) -> Result<Vec<RoleBindingApproval>> {
        let results = entity::role_binding_approval::Entity::find()
            .filter(
                entity::role_binding_approval::Column::RoleBindingUuid.eq(role_binding_uuid),
            )
            .filter(entity::role_binding_approval::Column::ArchivingTimestamp.eq(0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn archive_approval(&self, uuid: &str) -> Result<()> {
        let result = entity::role_binding_approval::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?
            .ok_or_else(|| Error::NotFound(format!("approval {}", uuid)))?;
        let mut approval: RoleBindingApproval = result.into();
        if approval.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("approval {}", uuid)));
        }

        approval.archive_mark = fresh_mark();
        approval.version = new_resource_version();
        let model: entity::role_binding_approval::ActiveModel = (&approval).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // servers

    async fn create_server(&self, server: &Server) -> Result<Server> {
        let project = self
            .get_project(&server.project_uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("project {}", server.project_uuid)))?;
        if project.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "project {}",
                server.project_uuid
            )));
        }

        let model: entity::server::ActiveModel = server.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_server(&self, uuid: &str) -> Result<Option<Server>> {
        let result = entity::server::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_servers(&self, tenant_uuid: &str, show_archived: bool) -> Result<Vec<Server>> {
        let mut query = entity::server::Entity::find()
            .filter(entity::server::Column::TenantUuid.eq(tenant_uuid));
        if !show_archived {
            query = query.filter(entity::server::Column::ArchivingTimestamp.eq(0));
        }
        let results = query.all(&self.conn).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_server(&self, server: &Server) -> Result<Server> {
        let current = self
            .get_server(&server.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("server {}", server.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("server {}", server.uuid)));
        }
        if current.version != server.version {
            return Err(Error::Conflict(format!("server {}", server.uuid)));
        }

        let mut updated = server.clone();
        updated.version = new_resource_version();
        let model: entity::server::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_server(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_server(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("server {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("server {}", uuid)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::server::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // multipasses

    async fn create_multipass(&self, multipass: &Multipass) -> Result<Multipass> {
        let model: entity::multipass::ActiveModel = multipass.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_multipass(&self, uuid: &str) -> Result<Option<Multipass>> {
        let result = entity::multipass::Entity::find_by_id(uuid.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_multipasses(&self, owner_uuid: &str) -> Result<Vec<Multipass>> {
        let results = entity::multipass::Entity::find()
            .filter(entity::multipass::Column::OwnerUuid.eq(owner_uuid))
            .filter(entity::multipass::Column::ArchivingTimestamp.eq(0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_multipass(&self, multipass: &Multipass) -> Result<Multipass> {
        let current = self
            .get_multipass(&multipass.uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("multipass {}", multipass.uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!(
                "multipass {}",
                multipass.uuid
            )));
        }
        if current.version != multipass.version {
            return Err(Error::Conflict(format!("multipass {}", multipass.uuid)));
        }

        let mut updated = multipass.clone();
        updated.version = new_resource_version();
        let model: entity::multipass::ActiveModel = (&updated).into();
        model.update(&self.conn).await?;
        Ok(updated)
    }

    async fn archive_multipass(&self, uuid: &str) -> Result<()> {
        let current = self
            .get_multipass(uuid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("multipass {}", uuid)))?;
        if current.archive_mark.is_archived() {
            return Err(Error::AlreadyArchived(format!("multipass {}", uuid)));
        }

        let mut archived = current;
        archived.archive_mark = fresh_mark();
        archived.version = new_resource_version();
        let model: entity::multipass::ActiveModel = (&archived).into();
        model.update(&self.conn).await?;
        Ok(())
    }

    // server-access extension

    async fn get_server_access_config(&self) -> Result<Option<ServerAccessConfig>> {
        let result = entity::server_access_config::Entity::find_by_id(1)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn set_server_access_config(&self, config: &ServerAccessConfig) -> Result<()> {
        let model: entity::server_access_config::ActiveModel = config.into();
        if self.get_server_access_config().await?.is_some() {
            model.update(&self.conn).await?;
        } else {
            model.insert(&self.conn).await?;
        }
        Ok(())
    }

    async fn ensure_server_access(
        &self,
        kind: SubjectKind,
        uuid: &str,
    ) -> Result<ServerAccessExtension> {
        let mut config = self.get_server_access_config().await?.ok_or_else(|| {
            Error::NotFound("server_access extension is not configured".to_string())
        })?;

        // fetch the current extension; populated means nothing to do
        let current = match kind {
            SubjectKind::User => self
                .get_user(uuid)
                .await?
                .ok_or_else(|| Error::NotFound(format!("user {}", uuid)))?
                .server_access,
            SubjectKind::ServiceAccount => self
                .get_service_account(uuid)
                .await?
                .ok_or_else(|| Error::NotFound(format!("service account {}", uuid)))?
                .server_access,
        };
        if let Some(ext) = current
            && ext.uid.is_some()
            && !ext.passwords.is_empty()
        {
            return Ok(ext);
        }

        let uid = config.last_allocated_uid + 1;
        config.last_allocated_uid = uid;
        self.set_server_access_config(&config).await?;

        let extension = ServerAccessExtension {
            uid: Some(uid),
            passwords: vec![new_password_entry(
                config.expire_password_seed_after_reveal_in,
            )],
        };

        match kind {
            SubjectKind::User => {
                // refetch inside the write to keep the version chain intact
                let mut user = self
                    .get_user(uuid)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("user {}", uuid)))?;
                user.server_access = Some(extension.clone());
                self.update_user(&user).await?;
            }
            SubjectKind::ServiceAccount => {
                let mut sa = self
                    .get_service_account(uuid)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("service account {}", uuid)))?;
                sa.server_access = Some(extension.clone());
                self.update_service_account(&sa).await?;
            }
        }

        tracing::info!(subject = %uuid, uid, "allocated posix uid");
        Ok(extension)
    }
}

//! database migrations for keygate.

pub use sea_orm_migration::prelude::*;

mod m20260810_000001_create_tenants;
mod m20260810_000002_create_projects;
mod m20260810_000003_create_users;
mod m20260810_000004_create_service_accounts;
mod m20260810_000005_create_groups;
mod m20260810_000006_create_identity_sharings;
mod m20260810_000007_create_roles;
mod m20260810_000008_create_role_bindings;
mod m20260810_000009_create_servers;
mod m20260810_000010_create_multipasses;
mod m20260810_000011_create_server_access_config;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_create_tenants::Migration),
            Box::new(m20260810_000002_create_projects::Migration),
            Box::new(m20260810_000003_create_users::Migration),
            Box::new(m20260810_000004_create_service_accounts::Migration),
            Box::new(m20260810_000005_create_groups::Migration),
            Box::new(m20260810_000006_create_identity_sharings::Migration),
            Box::new(m20260810_000007_create_roles::Migration),
            Box::new(m20260810_000008_create_role_bindings::Migration),
            Box::new(m20260810_000009_create_servers::Migration),
            Box::new(m20260810_000010_create_multipasses::Migration),
            Box::new(m20260810_000011_create_server_access_config::Migration),
        ]
    }
}

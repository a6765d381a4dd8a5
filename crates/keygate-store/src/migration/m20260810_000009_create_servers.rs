//! create servers table migration.

use sea_orm_migration::prelude::*;

use super::m20260810_000002_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Servers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Servers::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Servers::TenantUuid).string().not_null())
                    .col(ColumnDef::new(Servers::ProjectUuid).string().not_null())
                    .col(ColumnDef::new(Servers::Identifier).string().not_null())
                    .col(ColumnDef::new(Servers::Version).string().not_null())
                    .col(ColumnDef::new(Servers::Labels).text())
                    .col(ColumnDef::new(Servers::Annotations).text())
                    .col(ColumnDef::new(Servers::ConnectionInfo).text())
                    .col(
                        ColumnDef::new(Servers::MultipassUuid)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Servers::Fingerprint)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Servers::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Servers::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_servers_project")
                            .from(Servers::Table, Servers::ProjectUuid)
                            .to(Projects::Table, Projects::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_servers_tenant_uuid")
                    .table(Servers::Table)
                    .col(Servers::TenantUuid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_servers_project_uuid")
                    .table(Servers::Table)
                    .col(Servers::ProjectUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Servers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Servers {
    Table,
    Uuid,
    TenantUuid,
    ProjectUuid,
    Identifier,
    Version,
    Labels,
    Annotations,
    ConnectionInfo,
    MultipassUuid,
    Fingerprint,
    ArchivingTimestamp,
    ArchivingHash,
}

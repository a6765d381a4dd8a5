//! create projects table migration.

use sea_orm_migration::prelude::*;

use super::m20260810_000001_create_tenants::Tenants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::TenantUuid).string().not_null())
                    .col(ColumnDef::new(Projects::Identifier).string().not_null())
                    .col(ColumnDef::new(Projects::Version).string().not_null())
                    .col(
                        ColumnDef::new(Projects::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Projects::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_tenant")
                            .from(Projects::Table, Projects::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_tenant_uuid")
                    .table(Projects::Table)
                    .col(Projects::TenantUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Projects {
    Table,
    Uuid,
    TenantUuid,
    Identifier,
    Version,
    ArchivingTimestamp,
    ArchivingHash,
}

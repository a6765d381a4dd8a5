//! create groups table migration.

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
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::TenantUuid).string().not_null())
                    .col(ColumnDef::new(Groups::Identifier).string().not_null())
                    .col(ColumnDef::new(Groups::FullIdentifier).string().not_null())
                    .col(ColumnDef::new(Groups::Version).string().not_null())
                    .col(ColumnDef::new(Groups::Users).text())
                    .col(ColumnDef::new(Groups::ServiceAccounts).text())
                    .col(ColumnDef::new(Groups::Groups).text())
                    .col(
                        ColumnDef::new(Groups::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Groups::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_tenant")
                            .from(Groups::Table, Groups::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_groups_tenant_uuid")
                    .table(Groups::Table)
                    .col(Groups::TenantUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Groups {
    Table,
    Uuid,
    TenantUuid,
    Identifier,
    FullIdentifier,
    Version,
    Users,
    ServiceAccounts,
    Groups,
    ArchivingTimestamp,
    ArchivingHash,
}

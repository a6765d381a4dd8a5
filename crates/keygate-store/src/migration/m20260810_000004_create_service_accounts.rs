//! create service_accounts table migration.

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
                    .table(ServiceAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceAccounts::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceAccounts::TenantUuid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAccounts::Identifier)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAccounts::FullIdentifier)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceAccounts::Version).string().not_null())
                    .col(ColumnDef::new(ServiceAccounts::ServerAccess).text())
                    .col(
                        ColumnDef::new(ServiceAccounts::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServiceAccounts::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_accounts_tenant")
                            .from(ServiceAccounts::Table, ServiceAccounts::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_accounts_tenant_uuid")
                    .table(ServiceAccounts::Table)
                    .col(ServiceAccounts::TenantUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ServiceAccounts {
    Table,
    Uuid,
    TenantUuid,
    Identifier,
    FullIdentifier,
    Version,
    ServerAccess,
    ArchivingTimestamp,
    ArchivingHash,
}

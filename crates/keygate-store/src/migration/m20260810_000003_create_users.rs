//! create users table migration.

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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::TenantUuid).string().not_null())
                    .col(ColumnDef::new(Users::Identifier).string().not_null())
                    .col(ColumnDef::new(Users::FullIdentifier).string().not_null())
                    .col(ColumnDef::new(Users::Version).string().not_null())
                    .col(ColumnDef::new(Users::ServerAccess).text())
                    .col(
                        ColumnDef::new(Users::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_tenant")
                            .from(Users::Table, Users::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_tenant_uuid")
                    .table(Users::Table)
                    .col(Users::TenantUuid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_full_identifier")
                    .table(Users::Table)
                    .col(Users::FullIdentifier)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
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

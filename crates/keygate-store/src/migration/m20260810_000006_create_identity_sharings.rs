//! create identity_sharings table migration.

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
                    .table(IdentitySharings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdentitySharings::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdentitySharings::SourceTenantUuid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentitySharings::DestinationTenantUuid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentitySharings::Version)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdentitySharings::Groups).text())
                    .col(
                        ColumnDef::new(IdentitySharings::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(IdentitySharings::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_sharings_source")
                            .from(IdentitySharings::Table, IdentitySharings::SourceTenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_sharings_destination")
                            .from(
                                IdentitySharings::Table,
                                IdentitySharings::DestinationTenantUuid,
                            )
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_identity_sharings_destination")
                    .table(IdentitySharings::Table)
                    .col(IdentitySharings::DestinationTenantUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdentitySharings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum IdentitySharings {
    Table,
    Uuid,
    SourceTenantUuid,
    DestinationTenantUuid,
    Version,
    Groups,
    ArchivingTimestamp,
    ArchivingHash,
}

//! create multipasses table migration.

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
                    .table(Multipasses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Multipasses::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Multipasses::TenantUuid).string().not_null())
                    .col(ColumnDef::new(Multipasses::OwnerType).string().not_null())
                    .col(ColumnDef::new(Multipasses::OwnerUuid).string().not_null())
                    .col(ColumnDef::new(Multipasses::Version).string().not_null())
                    .col(
                        ColumnDef::new(Multipasses::TtlSeconds)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Multipasses::MaxTtlSeconds)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Multipasses::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Multipasses::AllowedCidrs).text())
                    .col(ColumnDef::new(Multipasses::AllowedRoles).text())
                    .col(
                        ColumnDef::new(Multipasses::ValidTill)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Multipasses::Salt)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Multipasses::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Multipasses::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_multipasses_tenant")
                            .from(Multipasses::Table, Multipasses::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_multipasses_owner")
                    .table(Multipasses::Table)
                    .col(Multipasses::OwnerUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Multipasses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Multipasses {
    Table,
    Uuid,
    TenantUuid,
    OwnerType,
    OwnerUuid,
    Version,
    TtlSeconds,
    MaxTtlSeconds,
    Description,
    AllowedCidrs,
    AllowedRoles,
    ValidTill,
    Salt,
    ArchivingTimestamp,
    ArchivingHash,
}

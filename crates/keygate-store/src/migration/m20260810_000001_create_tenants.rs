//! create tenants table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tenants::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tenants::Identifier).string().not_null())
                    .col(ColumnDef::new(Tenants::Version).string().not_null())
                    .col(ColumnDef::new(Tenants::FeatureFlags).text())
                    .col(
                        ColumnDef::new(Tenants::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tenants::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // tenant identifiers are globally unique among active records;
        // enforcing that in sql would block re-creating an archived name,
        // so only index it
        manager
            .create_index(
                Index::create()
                    .name("idx_tenants_identifier")
                    .table(Tenants::Table)
                    .col(Tenants::Identifier)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tenants {
    Table,
    Uuid,
    Identifier,
    Version,
    FeatureFlags,
    ArchivingTimestamp,
    ArchivingHash,
}

//! create roles table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Scope).string().not_null())
                    .col(
                        ColumnDef::new(Roles::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Roles::Version).string().not_null())
                    .col(ColumnDef::new(Roles::OptionsSchema).text())
                    .col(ColumnDef::new(Roles::IncludedRoles).text())
                    .col(ColumnDef::new(Roles::RequireOneOfFeatureFlags).text())
                    .col(
                        ColumnDef::new(Roles::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Roles::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Roles {
    Table,
    Name,
    Scope,
    Description,
    Version,
    OptionsSchema,
    IncludedRoles,
    RequireOneOfFeatureFlags,
    ArchivingTimestamp,
    ArchivingHash,
}

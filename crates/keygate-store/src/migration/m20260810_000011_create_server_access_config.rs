//! create server_access_config table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerAccessConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerAccessConfig::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServerAccessConfig::RoleForSshAccess)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ServerAccessConfig::RolesForServers).text())
                    .col(
                        ColumnDef::new(ServerAccessConfig::LastAllocatedUid)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServerAccessConfig::ExpirePasswordSeedAfterRevealIn)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServerAccessConfig::DeleteExpiredPasswordSeedsAfter)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerAccessConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ServerAccessConfig {
    Table,
    Id,
    RoleForSshAccess,
    RolesForServers,
    LastAllocatedUid,
    ExpirePasswordSeedAfterRevealIn,
    DeleteExpiredPasswordSeedsAfter,
}

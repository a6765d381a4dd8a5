//! create role_bindings and role_binding_approvals tables migration.

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
                    .table(RoleBindings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleBindings::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoleBindings::TenantUuid).string().not_null())
                    .col(
                        ColumnDef::new(RoleBindings::Identifier)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(RoleBindings::Version).string().not_null())
                    .col(ColumnDef::new(RoleBindings::Members).text())
                    .col(ColumnDef::new(RoleBindings::Roles).text())
                    .col(ColumnDef::new(RoleBindings::Projects).text())
                    .col(
                        ColumnDef::new(RoleBindings::AnyProject)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RoleBindings::ValidTill)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoleBindings::RequireMfa)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RoleBindings::Origin)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RoleBindings::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoleBindings::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_bindings_tenant")
                            .from(RoleBindings::Table, RoleBindings::TenantUuid)
                            .to(Tenants::Table, Tenants::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_bindings_tenant_uuid")
                    .table(RoleBindings::Table)
                    .col(RoleBindings::TenantUuid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleBindingApprovals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleBindingApprovals::Uuid)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::RoleBindingUuid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::TenantUuid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::Version)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RoleBindingApprovals::Approvers).text())
                    .col(
                        ColumnDef::new(RoleBindingApprovals::RequiredVotes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::RequireUnanimity)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::ArchivingTimestamp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoleBindingApprovals::ArchivingHash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_binding_approvals_binding")
                            .from(
                                RoleBindingApprovals::Table,
                                RoleBindingApprovals::RoleBindingUuid,
                            )
                            .to(RoleBindings::Table, RoleBindings::Uuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_binding_approvals_binding")
                    .table(RoleBindingApprovals::Table)
                    .col(RoleBindingApprovals::RoleBindingUuid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleBindingApprovals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleBindings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoleBindings {
    Table,
    Uuid,
    TenantUuid,
    Identifier,
    Version,
    Members,
    Roles,
    Projects,
    AnyProject,
    ValidTill,
    RequireMfa,
    Origin,
    ArchivingTimestamp,
    ArchivingHash,
}

#[derive(DeriveIden)]
pub enum RoleBindingApprovals {
    Table,
    Uuid,
    RoleBindingUuid,
    TenantUuid,
    Version,
    Approvers,
    RequiredVotes,
    RequireUnanimity,
    ArchivingTimestamp,
    ArchivingHash,
}

//! role binding entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::RoleBinding;

use super::{decode_list, encode_list, mark_from_columns};

/// role binding database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_bindings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    pub identifier: String,
    pub version: String,
    /// members stored as json array string.
    pub members: Option<String>,
    /// bound roles (with options) stored as json array string.
    pub roles: Option<String>,
    /// project uuids stored as json array string.
    pub projects: Option<String>,
    pub any_project: bool,
    pub valid_till: i64,
    pub require_mfa: bool,
    pub origin: String,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantUuid",
        to = "super::tenant::Column::Uuid"
    )]
    Tenant,
    #[sea_orm(has_many = "super::role_binding_approval::Entity")]
    Approvals,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::role_binding_approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoleBinding {
    fn from(model: Model) -> Self {
        RoleBinding {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            identifier: model.identifier,
            version: model.version,
            members: decode_list(model.members.as_deref()),
            roles: decode_list(model.roles.as_deref()),
            projects: decode_list(model.projects.as_deref()),
            any_project: model.any_project,
            valid_till: model.valid_till,
            require_mfa: model.require_mfa,
            origin: model.origin,
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&RoleBinding> for ActiveModel {
    fn from(binding: &RoleBinding) -> Self {
        ActiveModel {
            uuid: Set(binding.uuid.clone()),
            tenant_uuid: Set(binding.tenant_uuid.clone()),
            identifier: Set(binding.identifier.clone()),
            version: Set(binding.version.clone()),
            members: Set(encode_list(&binding.members)),
            roles: Set(encode_list(&binding.roles)),
            projects: Set(encode_list(&binding.projects)),
            any_project: Set(binding.any_project),
            valid_till: Set(binding.valid_till),
            require_mfa: Set(binding.require_mfa),
            origin: Set(binding.origin.clone()),
            archiving_timestamp: Set(binding.archive_mark.timestamp),
            archiving_hash: Set(binding.archive_mark.hash),
        }
    }
}

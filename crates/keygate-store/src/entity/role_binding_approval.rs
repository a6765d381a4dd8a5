//! role binding approval entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::RoleBindingApproval;

use super::{decode_list, encode_list, mark_from_columns};

/// role binding approval database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_binding_approvals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub role_binding_uuid: String,
    pub tenant_uuid: String,
    pub version: String,
    /// approver members stored as json array string.
    pub approvers: Option<String>,
    pub required_votes: i64,
    pub require_unanimity: bool,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role_binding::Entity",
        from = "Column::RoleBindingUuid",
        to = "super::role_binding::Column::Uuid"
    )]
    RoleBinding,
}

impl Related<super::role_binding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleBinding.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoleBindingApproval {
    fn from(model: Model) -> Self {
        RoleBindingApproval {
            uuid: model.uuid,
            role_binding_uuid: model.role_binding_uuid,
            tenant_uuid: model.tenant_uuid,
            version: model.version,
            approvers: decode_list(model.approvers.as_deref()),
            required_votes: model.required_votes,
            require_unanimity: model.require_unanimity,
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&RoleBindingApproval> for ActiveModel {
    fn from(approval: &RoleBindingApproval) -> Self {
        ActiveModel {
            uuid: Set(approval.uuid.clone()),
            role_binding_uuid: Set(approval.role_binding_uuid.clone()),
            tenant_uuid: Set(approval.tenant_uuid.clone()),
            version: Set(approval.version.clone()),
            approvers: Set(encode_list(&approval.approvers)),
            required_votes: Set(approval.required_votes),
            require_unanimity: Set(approval.require_unanimity),
            archiving_timestamp: Set(approval.archive_mark.timestamp),
            archiving_hash: Set(approval.archive_mark.hash),
        }
    }
}

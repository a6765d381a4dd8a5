//! group entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::Group;

use super::{decode_list, encode_list, mark_from_columns};

/// group database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    pub identifier: String,
    pub full_identifier: String,
    pub version: String,
    /// member user uuids stored as json array string.
    pub users: Option<String>,
    /// member service account uuids stored as json array string.
    pub service_accounts: Option<String>,
    /// member group uuids stored as json array string.
    pub groups: Option<String>,
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
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Group {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            identifier: model.identifier,
            full_identifier: model.full_identifier,
            version: model.version,
            users: decode_list(model.users.as_deref()),
            service_accounts: decode_list(model.service_accounts.as_deref()),
            groups: decode_list(model.groups.as_deref()),
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        ActiveModel {
            uuid: Set(group.uuid.clone()),
            tenant_uuid: Set(group.tenant_uuid.clone()),
            identifier: Set(group.identifier.clone()),
            full_identifier: Set(group.full_identifier.clone()),
            version: Set(group.version.clone()),
            users: Set(encode_list(&group.users)),
            service_accounts: Set(encode_list(&group.service_accounts)),
            groups: Set(encode_list(&group.groups)),
            archiving_timestamp: Set(group.archive_mark.timestamp),
            archiving_hash: Set(group.archive_mark.hash),
        }
    }
}

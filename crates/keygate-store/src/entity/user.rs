//! user entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::User;

use super::mark_from_columns;

/// user database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    pub identifier: String,
    pub full_identifier: String,
    pub version: String,
    /// server-access extension stored as json object string.
    pub server_access: Option<String>,
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

impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            identifier: model.identifier,
            full_identifier: model.full_identifier,
            version: model.version,
            server_access: model
                .server_access
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            uuid: Set(user.uuid.clone()),
            tenant_uuid: Set(user.tenant_uuid.clone()),
            identifier: Set(user.identifier.clone()),
            full_identifier: Set(user.full_identifier.clone()),
            version: Set(user.version.clone()),
            server_access: Set(user
                .server_access
                .as_ref()
                .and_then(|e| serde_json::to_string(e).ok())),
            archiving_timestamp: Set(user.archive_mark.timestamp),
            archiving_hash: Set(user.archive_mark.hash),
        }
    }
}

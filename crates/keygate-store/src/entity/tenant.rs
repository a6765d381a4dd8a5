//! tenant entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::Tenant;

use super::{decode_list, encode_list, mark_from_columns};

/// tenant database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub identifier: String,
    pub version: String,
    /// feature flags stored as json array string.
    pub feature_flags: Option<String>,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Tenant {
    fn from(model: Model) -> Self {
        Tenant {
            uuid: model.uuid,
            identifier: model.identifier,
            version: model.version,
            feature_flags: decode_list(model.feature_flags.as_deref()),
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Tenant> for ActiveModel {
    fn from(tenant: &Tenant) -> Self {
        ActiveModel {
            uuid: Set(tenant.uuid.clone()),
            identifier: Set(tenant.identifier.clone()),
            version: Set(tenant.version.clone()),
            feature_flags: Set(encode_list(&tenant.feature_flags)),
            archiving_timestamp: Set(tenant.archive_mark.timestamp),
            archiving_hash: Set(tenant.archive_mark.hash),
        }
    }
}

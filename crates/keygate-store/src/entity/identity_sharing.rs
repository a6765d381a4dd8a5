//! identity sharing entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::IdentitySharing;

use super::{decode_list, encode_list, mark_from_columns};

/// identity sharing database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identity_sharings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub source_tenant_uuid: String,
    pub destination_tenant_uuid: String,
    pub version: String,
    /// shared group uuids stored as json array string.
    pub groups: Option<String>,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IdentitySharing {
    fn from(model: Model) -> Self {
        IdentitySharing {
            uuid: model.uuid,
            source_tenant_uuid: model.source_tenant_uuid,
            destination_tenant_uuid: model.destination_tenant_uuid,
            version: model.version,
            groups: decode_list(model.groups.as_deref()),
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&IdentitySharing> for ActiveModel {
    fn from(sharing: &IdentitySharing) -> Self {
        ActiveModel {
            uuid: Set(sharing.uuid.clone()),
            source_tenant_uuid: Set(sharing.source_tenant_uuid.clone()),
            destination_tenant_uuid: Set(sharing.destination_tenant_uuid.clone()),
            version: Set(sharing.version.clone()),
            groups: Set(encode_list(&sharing.groups)),
            archiving_timestamp: Set(sharing.archive_mark.timestamp),
            archiving_hash: Set(sharing.archive_mark.hash),
        }
    }
}

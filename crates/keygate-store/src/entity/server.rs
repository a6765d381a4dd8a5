//! server entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::Server;

use super::mark_from_columns;

/// server database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "servers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    pub project_uuid: String,
    pub identifier: String,
    pub version: String,
    /// selector labels stored as json object string.
    pub labels: Option<String>,
    /// annotations stored as json object string.
    pub annotations: Option<String>,
    /// connection info stored as json object string.
    pub connection_info: Option<String>,
    pub multipass_uuid: String,
    pub fingerprint: String,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectUuid",
        to = "super::project::Column::Uuid"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn decode_map(raw: Option<&str>) -> std::collections::BTreeMap<String, String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn encode_map(map: &std::collections::BTreeMap<String, String>) -> Option<String> {
    if map.is_empty() {
        None
    } else {
        Some(serde_json::to_string(map).unwrap_or_default())
    }
}

impl From<Model> for Server {
    fn from(model: Model) -> Self {
        Server {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            project_uuid: model.project_uuid,
            identifier: model.identifier,
            version: model.version,
            labels: decode_map(model.labels.as_deref()),
            annotations: decode_map(model.annotations.as_deref()),
            connection_info: model
                .connection_info
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default(),
            multipass_uuid: model.multipass_uuid,
            fingerprint: model.fingerprint,
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Server> for ActiveModel {
    fn from(server: &Server) -> Self {
        ActiveModel {
            uuid: Set(server.uuid.clone()),
            tenant_uuid: Set(server.tenant_uuid.clone()),
            project_uuid: Set(server.project_uuid.clone()),
            identifier: Set(server.identifier.clone()),
            version: Set(server.version.clone()),
            labels: Set(encode_map(&server.labels)),
            annotations: Set(encode_map(&server.annotations)),
            connection_info: Set(serde_json::to_string(&server.connection_info).ok()),
            multipass_uuid: Set(server.multipass_uuid.clone()),
            fingerprint: Set(server.fingerprint.clone()),
            archiving_timestamp: Set(server.archive_mark.timestamp),
            archiving_hash: Set(server.archive_mark.hash),
        }
    }
}

//! project entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::Project;

use super::mark_from_columns;

/// project database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    pub identifier: String,
    pub version: String,
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

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Project {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            identifier: model.identifier,
            version: model.version,
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Project> for ActiveModel {
    fn from(project: &Project) -> Self {
        ActiveModel {
            uuid: Set(project.uuid.clone()),
            tenant_uuid: Set(project.tenant_uuid.clone()),
            identifier: Set(project.identifier.clone()),
            version: Set(project.version.clone()),
            archiving_timestamp: Set(project.archive_mark.timestamp),
            archiving_hash: Set(project.archive_mark.hash),
        }
    }
}

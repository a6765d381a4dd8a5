//! role entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::{Role, RoleScope};

use super::{decode_list, encode_list, mark_from_columns};

/// role database model. roles are keyed by name, not uuid.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// "tenant" or "project".
    pub scope: String,
    pub description: String,
    pub version: String,
    /// options schema stored as json object string.
    pub options_schema: Option<String>,
    /// included roles stored as json array string.
    pub included_roles: Option<String>,
    /// required feature flags stored as json array string.
    pub require_one_of_feature_flags: Option<String>,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        let scope = match model.scope.as_str() {
            "tenant" => RoleScope::Tenant,
            _ => RoleScope::Project,
        };
        Role {
            name: model.name,
            scope,
            description: model.description,
            version: model.version,
            options_schema: model
                .options_schema
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default(),
            included_roles: decode_list(model.included_roles.as_deref()),
            require_one_of_feature_flags: decode_list(
                model.require_one_of_feature_flags.as_deref(),
            ),
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Role> for ActiveModel {
    fn from(role: &Role) -> Self {
        let scope = match role.scope {
            RoleScope::Tenant => "tenant",
            RoleScope::Project => "project",
        };
        ActiveModel {
            name: Set(role.name.clone()),
            scope: Set(scope.to_string()),
            description: Set(role.description.clone()),
            version: Set(role.version.clone()),
            options_schema: Set(serde_json::to_string(&role.options_schema).ok()),
            included_roles: Set(encode_list(&role.included_roles)),
            require_one_of_feature_flags: Set(encode_list(&role.require_one_of_feature_flags)),
            archiving_timestamp: Set(role.archive_mark.timestamp),
            archiving_hash: Set(role.archive_mark.hash),
        }
    }
}

//! roles and their option schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ArchiveMark, RoleName, new_resource_version};

/// the scope at which a role applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// the role applies to whole tenants.
    Tenant,
    /// the role applies to individual projects.
    Project,
}

/// the type of a role option schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// a json string.
    String,
    /// a json number (integer or float).
    Number,
    /// a json boolean.
    Boolean,
}

/// one property of a role's options schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSchemaProperty {
    /// expected json type of the property value.
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// a role's options schema: which option keys exist and which are required.
///
/// a looser schema is backwards compatible with a stricter one, so a role
/// update may drop requirements and add optional properties but never add
/// a requirement or remove a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsSchema {
    /// option keys that must be present.
    #[serde(default)]
    pub required: Vec<String>,
    /// all known option keys with their expected types.
    #[serde(default)]
    pub properties: BTreeMap<String, OptionSchemaProperty>,
}

/// one inclusion edge of the role graph.
///
/// binding the including role implicitly binds the included role; the
/// `options_template` (if any) maps the outer options onto the inner
/// role's options when the grant is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedRole {
    /// name of the included role.
    pub name: RoleName,
    /// optional template rewriting options for the included role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_template: Option<String>,
}

/// a globally named role.
///
/// roles are global (not tenant-owned) and form a directed graph through
/// `included_roles`. they are archived, never renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// unique global name, also the primary key.
    pub name: RoleName,

    /// scope at which bindings of this role apply.
    pub scope: RoleScope,

    /// free-form description for operators.
    #[serde(default)]
    pub description: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// schema constraining the options of bindings of this role.
    #[serde(default)]
    pub options_schema: OptionsSchema,

    /// roles implicitly granted by this role.
    #[serde(default)]
    pub included_roles: Vec<IncludedRole>,

    /// feature flags of which at least one must be enabled on a tenant
    /// for this role to be bindable there; empty means no restriction.
    #[serde(default)]
    pub require_one_of_feature_flags: Vec<String>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Role {
    /// create a new active role with an empty schema and no inclusions.
    pub fn new(name: impl Into<RoleName>, scope: RoleScope) -> Self {
        Self {
            name: name.into(),
            scope,
            description: String::new(),
            version: new_resource_version(),
            options_schema: OptionsSchema::default(),
            included_roles: Vec::new(),
            require_one_of_feature_flags: Vec::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_json_shape() {
        let schema: OptionsSchema = serde_json::from_str(
            r#"{"required": ["max_ttl"], "properties": {"max_ttl": {"type": "string"}}}"#,
        )
        .unwrap();
        assert_eq!(schema.required, vec!["max_ttl"]);
        assert_eq!(
            schema.properties["max_ttl"].option_type,
            OptionType::String
        );
    }
}

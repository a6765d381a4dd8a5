//! the role graph: inclusion closures and option schemas.

use std::collections::HashSet;

use keygate_types::{BoundRole, OptionType, OptionsSchema, Role, Tenant};
use serde_json::Value;

use crate::error::{Error, OptionsError, Result, SchemaCompatError};
use crate::informer::Directory;

/// the role itself plus every role it transitively includes.
///
/// binding a role implicitly grants its whole inclusion closure. missing
/// or archived included roles are skipped silently; the graph tolerates
/// dangling edges left by archived roles.
pub fn role_closure(dir: &dyn Directory, name: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    let mut frontier: Vec<&str> = vec![name];

    while let Some(current) = frontier.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(role) = dir.role(current) else {
            continue;
        };
        if role.archive_mark.is_archived() {
            continue;
        }
        out.push(role.name.clone());
        for included in &role.included_roles {
            frontier.push(&included.name);
        }
    }

    out
}

/// the role itself plus every role that transitively includes it.
///
/// this is the set of role names whose grant implies the given role:
/// a binding that carries any of them effectively carries `name`.
pub fn ancestor_roles(dir: &dyn Directory, name: &str) -> HashSet<String> {
    let mut ancestors: HashSet<String> = HashSet::new();
    ancestors.insert(name.to_string());
    let mut frontier: Vec<String> = vec![name.to_string()];

    while let Some(current) = frontier.pop() {
        for role in dir.roles() {
            if role.archive_mark.is_active()
                && role.included_roles.iter().any(|inc| inc.name == current)
                && ancestors.insert(role.name.clone())
            {
                frontier.push(role.name.clone());
            }
        }
    }

    ancestors
}

/// validate one bound role's options against the role's schema.
pub fn validate_options(role: &Role, options: &serde_json::Map<String, Value>) -> Result<()> {
    check_schema(&role.options_schema, options).map_err(|cause| Error::RoleOptions {
        role: role.name.clone(),
        cause,
    })
}

/// validate every role of a binding against the directory.
///
/// checks that each role exists, that the tenant carries a required
/// feature flag if the role demands one, and that the options satisfy the
/// schema. the store calls this before persisting a binding.
pub fn validate_bound_roles(
    dir: &dyn Directory,
    tenant: &Tenant,
    roles: &[BoundRole],
) -> Result<()> {
    for bound in roles {
        let role = dir
            .role(&bound.name)
            .filter(|r| r.archive_mark.is_active())
            .ok_or_else(|| Error::RoleNotFound(bound.name.clone()))?;

        if !role.require_one_of_feature_flags.is_empty()
            && !role
                .require_one_of_feature_flags
                .iter()
                .any(|flag| tenant.feature_flags.contains(flag))
        {
            return Err(Error::FeatureFlagRequired {
                role: role.name.clone(),
                flags: role.require_one_of_feature_flags.clone(),
            });
        }

        validate_options(role, &bound.options)?;
    }
    Ok(())
}

fn check_schema(
    schema: &OptionsSchema,
    options: &serde_json::Map<String, Value>,
) -> std::result::Result<(), OptionsError> {
    for required in &schema.required {
        if !options.contains_key(required) {
            return Err(OptionsError::MissingRequired(required.clone()));
        }
    }

    for (key, value) in options {
        let Some(property) = schema.properties.get(key) else {
            return Err(OptionsError::UnknownKey(key.clone()));
        };
        let ok = match property.option_type {
            OptionType::String => value.is_string(),
            OptionType::Number => value.is_number(),
            OptionType::Boolean => value.is_boolean(),
        };
        if !ok {
            return Err(OptionsError::WrongType {
                key: key.clone(),
                expected: match property.option_type {
                    OptionType::String => "string",
                    OptionType::Number => "number",
                    OptionType::Boolean => "boolean",
                },
            });
        }
    }

    Ok(())
}

/// check that a schema update cannot invalidate existing bindings.
///
/// the new schema may drop requirements and add optional properties, but
/// must not add a requirement, remove a property or change a property's
/// type.
pub fn check_backwards_compatible(
    old: &OptionsSchema,
    new: &OptionsSchema,
) -> std::result::Result<(), SchemaCompatError> {
    for required in &new.required {
        if !old.required.contains(required) {
            return Err(SchemaCompatError::NewRequirement(required.clone()));
        }
    }

    for (key, old_property) in &old.properties {
        match new.properties.get(key) {
            None => return Err(SchemaCompatError::RemovedProperty(key.clone())),
            Some(new_property) if new_property.option_type != old_property.option_type => {
                return Err(SchemaCompatError::ChangedType(key.clone()));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use keygate_types::{IncludedRole, OptionSchemaProperty, RoleScope};

    use super::*;
    use crate::informer::SnapshotCatalog;

    fn role_with_inclusion(name: &str, includes: &[&str]) -> Role {
        let mut role = Role::new(name, RoleScope::Project);
        role.included_roles = includes
            .iter()
            .map(|n| IncludedRole {
                name: n.to_string(),
                options_template: None,
            })
            .collect();
        role
    }

    #[test]
    fn test_role_closure_follows_inclusions() {
        let mut catalog = SnapshotCatalog::new();
        catalog.add_role(role_with_inclusion("ssh.master", &["ssh.open"]));
        catalog.add_role(role_with_inclusion("ssh.open", &["servers.query"]));
        catalog.add_role(role_with_inclusion("servers.query", &[]));

        let closure = role_closure(&catalog, "ssh.master");
        assert_eq!(closure.len(), 3);
        assert!(closure.contains(&"servers.query".to_string()));
    }

    #[test]
    fn test_role_closure_tolerates_dangling_edge() {
        let mut catalog = SnapshotCatalog::new();
        catalog.add_role(role_with_inclusion("ssh.open", &["gone"]));

        let closure = role_closure(&catalog, "ssh.open");
        assert_eq!(closure, vec!["ssh.open".to_string()]);
    }

    #[test]
    fn test_ancestor_roles() {
        let mut catalog = SnapshotCatalog::new();
        catalog.add_role(role_with_inclusion("ssh.master", &["ssh.open"]));
        catalog.add_role(role_with_inclusion("ssh.open", &["servers.query"]));
        catalog.add_role(role_with_inclusion("servers.query", &[]));

        let ancestors = ancestor_roles(&catalog, "servers.query");
        assert!(ancestors.contains("servers.query"));
        assert!(ancestors.contains("ssh.open"));
        assert!(ancestors.contains("ssh.master"));

        let ancestors = ancestor_roles(&catalog, "ssh.master");
        assert_eq!(ancestors.len(), 1);
    }

    fn schema(required: &[&str], properties: &[(&str, OptionType)]) -> OptionsSchema {
        OptionsSchema {
            required: required.iter().map(|s| s.to_string()).collect(),
            properties: properties
                .iter()
                .map(|(name, option_type)| {
                    (
                        name.to_string(),
                        OptionSchemaProperty {
                            option_type: *option_type,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_options_error_names_the_role() {
        let mut role = Role::new("ssh.open", RoleScope::Project);
        role.options_schema = schema(&["max_ttl"], &[("max_ttl", OptionType::String)]);

        let err = validate_options(&role, &serde_json::Map::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "check options for role \"ssh.open\": required option \"max_ttl\" is missing"
        );
    }

    #[test]
    fn test_validate_options_type_and_unknown_key() {
        let mut role = Role::new("ssh.open", RoleScope::Project);
        role.options_schema = schema(&[], &[("ttl", OptionType::Number)]);

        let mut options = serde_json::Map::new();
        options.insert("ttl".to_string(), Value::String("60".to_string()));
        assert!(validate_options(&role, &options).is_err());

        options.clear();
        options.insert("ttl".to_string(), Value::from(60));
        assert!(validate_options(&role, &options).is_ok());

        options.insert("color".to_string(), Value::from("red"));
        assert!(validate_options(&role, &options).is_err());
    }

    #[test]
    fn test_feature_flag_gate() {
        let mut catalog = SnapshotCatalog::new();
        let mut role = Role::new("flow.use", RoleScope::Tenant);
        role.require_one_of_feature_flags = vec!["flow".to_string()];
        catalog.add_role(role);

        let mut tenant = Tenant::new("acme");
        let bound = vec![BoundRole::new("flow.use")];
        assert!(validate_bound_roles(&catalog, &tenant, &bound).is_err());

        tenant.feature_flags.push("flow".to_string());
        assert!(validate_bound_roles(&catalog, &tenant, &bound).is_ok());
    }

    #[test]
    fn test_schema_compat() {
        let old = schema(&["a"], &[("a", OptionType::String), ("b", OptionType::Number)]);

        // dropping a requirement is fine
        let looser = schema(&[], &[("a", OptionType::String), ("b", OptionType::Number)]);
        assert!(check_backwards_compatible(&old, &looser).is_ok());

        // adding an optional property is fine
        let wider = schema(
            &["a"],
            &[
                ("a", OptionType::String),
                ("b", OptionType::Number),
                ("c", OptionType::Boolean),
            ],
        );
        assert!(check_backwards_compatible(&old, &wider).is_ok());

        // new requirement breaks
        let stricter = schema(
            &["a", "b"],
            &[("a", OptionType::String), ("b", OptionType::Number)],
        );
        assert!(check_backwards_compatible(&old, &stricter).is_err());

        // removed property breaks
        let narrower = schema(&["a"], &[("a", OptionType::String)]);
        assert!(check_backwards_compatible(&old, &narrower).is_err());

        // changed type breaks
        let retyped = schema(&["a"], &[("a", OptionType::String), ("b", OptionType::String)]);
        assert!(check_backwards_compatible(&old, &retyped).is_err());
    }
}

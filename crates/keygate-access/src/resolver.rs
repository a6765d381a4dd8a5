//! effective-role resolution.
//!
//! answers: given a subject and a list of role names, in which tenants
//! (and which of their projects) does the subject effectively hold each
//! role. "effectively" folds in group membership, identity sharing and
//! the role inclusion graph: a binding granting `ssh.master` also answers
//! for `ssh.open` when `ssh.master` includes it.

use std::collections::HashSet;

use keygate_types::{RoleScope, SubjectRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::informer::Directory;
use crate::membership::{
    groups_effective_in_tenant, subject_group_closure, subject_matches_members,
};
use crate::roles::ancestor_roles;

/// a project in which an effective role applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveProject {
    /// project uuid.
    pub uuid: String,
    /// project identifier.
    pub identifier: String,
}

/// a tenant in which an effective role applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveTenant {
    /// tenant uuid.
    pub uuid: String,
    /// tenant identifier.
    pub identifier: String,
    /// covered projects; empty for tenant-scoped roles.
    pub projects: Vec<EffectiveProject>,
}

/// resolution result for one requested role.
///
/// an empty `tenants` list means the subject does not hold the role
/// anywhere. results keep the request order of the role names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRole {
    /// the requested role name.
    pub role: String,
    /// tenants (with projects) where the role is held.
    pub tenants: Vec<EffectiveTenant>,
}

/// resolve the effective roles of a subject.
///
/// `now` is the unix time used for binding expiry. returns one entry per
/// requested role, in request order, plus warnings for references the
/// directory could not satisfy (dangling projects, unknown roles).
pub fn effective_roles(
    dir: &dyn Directory,
    subject: &SubjectRef,
    roles: &[String],
    now: i64,
) -> (Vec<EffectiveRole>, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let closure = subject_group_closure(dir, subject);

    let results = roles
        .iter()
        .map(|role_name| {
            let Some(role) = dir
                .role(role_name)
                .filter(|r| r.archive_mark.is_active())
            else {
                warnings.push(format!("role {:?} not found", role_name));
                return EffectiveRole {
                    role: role_name.clone(),
                    tenants: Vec::new(),
                };
            };

            let implied_by = ancestor_roles(dir, role_name);
            let mut tenants = Vec::new();

            for tenant in dir.tenants() {
                if tenant.archive_mark.is_archived() {
                    continue;
                }

                let effective_groups = groups_effective_in_tenant(dir, &closure, &tenant.uuid);

                let mut any_project = false;
                let mut project_uuids: Vec<String> = Vec::new();
                let mut seen_projects: HashSet<String> = HashSet::new();
                let mut matched = false;

                for binding in dir.bindings_of_tenant(&tenant.uuid) {
                    if binding.archive_mark.is_archived()
                        || binding.expired_at(now)
                        || !binding.roles.iter().any(|r| implied_by.contains(&r.name))
                        || !subject_matches_members(subject, &binding.members, &effective_groups)
                    {
                        continue;
                    }

                    matched = true;
                    any_project = any_project || binding.any_project;
                    for uuid in &binding.projects {
                        if seen_projects.insert(uuid.clone()) {
                            project_uuids.push(uuid.clone());
                        }
                    }
                }

                if !matched {
                    continue;
                }

                let projects = match role.scope {
                    RoleScope::Tenant => Vec::new(),
                    RoleScope::Project if any_project => dir
                        .projects_of_tenant(&tenant.uuid)
                        .into_iter()
                        .map(|p| EffectiveProject {
                            uuid: p.uuid.clone(),
                            identifier: p.identifier.clone(),
                        })
                        .collect(),
                    RoleScope::Project => project_uuids
                        .into_iter()
                        .filter_map(|uuid| match dir.project(&uuid) {
                            Some(p) if p.archive_mark.is_active() => Some(EffectiveProject {
                                uuid: p.uuid.clone(),
                                identifier: p.identifier.clone(),
                            }),
                            Some(_) => None,
                            None => {
                                warnings.push(format!("project {:?} not found", uuid));
                                None
                            }
                        })
                        .collect(),
                };

                tenants.push(EffectiveTenant {
                    uuid: tenant.uuid.clone(),
                    identifier: tenant.identifier.clone(),
                    projects,
                });
            }

            debug!(role = %role_name, tenants = tenants.len(), "resolved effective role");
            EffectiveRole {
                role: role_name.clone(),
                tenants,
            }
        })
        .collect();

    (results, warnings)
}

#[cfg(test)]
mod tests {
    use keygate_types::{
        ArchiveMark, BoundRole, Group, IdentitySharing, Member, Project, Role, RoleBinding,
        Tenant,
    };

    use super::*;
    use crate::informer::SnapshotCatalog;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        catalog: SnapshotCatalog,
        tenant: Tenant,
        project: Project,
    }

    fn fixture() -> Fixture {
        let mut catalog = SnapshotCatalog::new();
        let tenant = Tenant::new("acme");
        let project = Project::new(tenant.uuid.clone(), "web");
        catalog.add_tenant(tenant.clone());
        catalog.add_project(project.clone());
        catalog.add_role(Role::new("ssh.open", RoleScope::Project));
        Fixture {
            catalog,
            tenant,
            project,
        }
    }

    fn binding(
        tenant: &Tenant,
        member: Member,
        role: &str,
        projects: Vec<String>,
        any_project: bool,
    ) -> RoleBinding {
        let mut rb = RoleBinding::new(tenant.uuid.clone(), "rb");
        rb.members.push(member);
        rb.roles.push(BoundRole::new(role));
        rb.projects = projects;
        rb.any_project = any_project;
        rb
    }

    #[test]
    fn test_direct_member_gets_role_in_project() {
        let mut f = fixture();
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![f.project.uuid.clone()],
            false,
        ));

        let (results, warnings) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert!(warnings.is_empty());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tenants.len(), 1);
        assert_eq!(results[0].tenants[0].projects.len(), 1);
        assert_eq!(results[0].tenants[0].projects[0].uuid, f.project.uuid);
    }

    #[test]
    fn test_non_member_gets_empty_entry() {
        let f = fixture();
        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("stranger"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results.len(), 1);
        assert!(results[0].tenants.is_empty());
    }

    #[test]
    fn test_any_project_covers_later_projects() {
        let mut f = fixture();
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![],
            true,
        ));
        // project created after the binding
        let late = Project::new(f.tenant.uuid.clone(), "late");
        f.catalog.add_project(late.clone());

        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        let projects = &results[0].tenants[0].projects;
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().any(|p| p.uuid == late.uuid));
    }

    #[test]
    fn test_expired_binding_ignored() {
        let mut f = fixture();
        let mut rb = binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![f.project.uuid.clone()],
            false,
        );
        rb.valid_till = NOW - 1;
        f.catalog.add_binding(rb);

        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert!(results[0].tenants.is_empty());
    }

    #[test]
    fn test_archived_binding_loses_grants() {
        let mut f = fixture();
        let mut rb = binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![f.project.uuid.clone()],
            false,
        );

        let mut active = f.catalog.clone();
        active.add_binding(rb.clone());
        let (results, _) = effective_roles(
            &active,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results[0].tenants.len(), 1);

        rb.archive_mark = ArchiveMark::new(NOW, 1);
        f.catalog.add_binding(rb);
        let (results, warnings) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert!(results[0].tenants.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_including_role_implies_included() {
        let mut f = fixture();
        let mut master = Role::new("ssh.master", RoleScope::Project);
        master.included_roles.push(keygate_types::IncludedRole {
            name: "ssh.open".to_string(),
            options_template: None,
        });
        f.catalog.add_role(master);
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.master",
            vec![f.project.uuid.clone()],
            false,
        ));

        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results[0].tenants.len(), 1);
    }

    #[test]
    fn test_group_membership_through_sharing() {
        let mut f = fixture();
        let away = Tenant::new("globex");
        f.catalog.add_tenant(away.clone());

        let mut group = Group::new(away.uuid.clone(), "ops", "globex");
        group.users.push("u1".to_string());
        f.catalog.add_group(group.clone());
        f.catalog.add_sharing(IdentitySharing::new(
            away.uuid.clone(),
            f.tenant.uuid.clone(),
            vec![group.uuid.clone()],
        ));
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::group(group.uuid.clone()),
            "ssh.open",
            vec![f.project.uuid.clone()],
            false,
        ));

        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results[0].tenants.len(), 1);
        assert_eq!(results[0].tenants[0].uuid, f.tenant.uuid);
    }

    #[test]
    fn test_dangling_project_warns_and_skips() {
        let mut f = fixture();
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![f.project.uuid.clone(), "gone".to_string()],
            false,
        ));

        let (results, warnings) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results[0].tenants[0].projects.len(), 1);
        assert_eq!(warnings, vec!["project \"gone\" not found".to_string()]);
    }

    #[test]
    fn test_unknown_role_warns_and_keeps_order() {
        let mut f = fixture();
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "ssh.open",
            vec![],
            true,
        ));

        let (results, warnings) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["nope".to_string(), "ssh.open".to_string()],
            NOW,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].role, "nope");
        assert!(results[0].tenants.is_empty());
        assert_eq!(results[1].role, "ssh.open");
        assert_eq!(results[1].tenants.len(), 1);
        assert_eq!(warnings, vec!["role \"nope\" not found".to_string()]);
    }

    #[test]
    fn test_tenant_scoped_role_has_no_projects() {
        let mut f = fixture();
        f.catalog.add_role(Role::new("tenant.read", RoleScope::Tenant));
        f.catalog.add_binding(binding(
            &f.tenant,
            Member::user("u1"),
            "tenant.read",
            vec![],
            true,
        ));

        let (results, _) = effective_roles(
            &f.catalog,
            &SubjectRef::user("u1"),
            &["tenant.read".to_string()],
            NOW,
        );
        assert_eq!(results[0].tenants.len(), 1);
        assert!(results[0].tenants[0].projects.is_empty());
    }
}

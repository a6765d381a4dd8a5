//! group membership resolution.
//!
//! groups nest arbitrarily and may cross tenant boundaries through
//! identity sharing, so "is this subject a member of that binding" is a
//! closure computation: collect every group that transitively contains
//! the subject, then keep the ones that count inside the binding's
//! tenant.

use std::collections::HashSet;

use keygate_types::{Member, MemberKind, SubjectRef};

use crate::informer::Directory;

/// every group that transitively contains the given subject.
///
/// walks the containment graph upward with a visited set, so membership
/// cycles terminate. archived groups do not contribute membership.
pub fn subject_group_closure(dir: &dyn Directory, subject: &SubjectRef) -> HashSet<String> {
    let seeds: Vec<String> = dir
        .groups()
        .iter()
        .filter(|g| g.archive_mark.is_active() && g.contains_subject(subject))
        .map(|g| g.uuid.clone())
        .collect();
    parent_closure(dir, &seeds)
}

/// the given groups plus every group that transitively contains one of them.
pub fn parent_closure(dir: &dyn Directory, start: &[String]) -> HashSet<String> {
    let mut visited: HashSet<String> = start.iter().cloned().collect();
    let mut frontier: Vec<String> = start.to_vec();

    while let Some(current) = frontier.pop() {
        for group in dir.groups() {
            if group.archive_mark.is_active()
                && group.contains_group(&current)
                && visited.insert(group.uuid.clone())
            {
                frontier.push(group.uuid.clone());
            }
        }
    }

    visited
}

/// groups from a closure that count as members inside the given tenant.
///
/// a group counts if it belongs to the tenant, or if an identity sharing
/// into the tenant lists it (or lists a group it is contained in, which
/// the closure already covers).
pub fn groups_effective_in_tenant(
    dir: &dyn Directory,
    closure: &HashSet<String>,
    tenant_uuid: &str,
) -> HashSet<String> {
    let shared: HashSet<&str> = dir
        .sharings_into_tenant(tenant_uuid)
        .iter()
        .flat_map(|s| s.groups.iter().map(String::as_str))
        .collect();

    closure
        .iter()
        .filter(|uuid| {
            if let Some(group) = dir.group(uuid) {
                group.tenant_uuid == tenant_uuid || shared.contains(uuid.as_str())
            } else {
                false
            }
        })
        .cloned()
        .collect()
}

/// true if the subject matches one of a binding's members inside a tenant.
///
/// direct user/service-account members match by uuid; group members match
/// if the group is in the subject's effective closure for the tenant.
pub fn subject_matches_members(
    subject: &SubjectRef,
    members: &[Member],
    effective_groups: &HashSet<String>,
) -> bool {
    members.iter().any(|member| match member.kind {
        MemberKind::Group => effective_groups.contains(&member.uuid),
        _ => member
            .as_subject()
            .is_some_and(|s| s.kind == subject.kind && s.uuid == subject.uuid),
    })
}

#[cfg(test)]
mod tests {
    use keygate_types::{ArchiveMark, Group, IdentitySharing, Tenant};

    use super::*;
    use crate::informer::SnapshotCatalog;

    fn catalog_with_tenant(identifier: &str) -> (SnapshotCatalog, Tenant) {
        let mut catalog = SnapshotCatalog::new();
        let tenant = Tenant::new(identifier);
        catalog.add_tenant(tenant.clone());
        (catalog, tenant)
    }

    #[test]
    fn test_nested_group_closure() {
        let (mut catalog, tenant) = catalog_with_tenant("acme");

        let mut inner = Group::new(tenant.uuid.clone(), "inner", "acme");
        inner.users.push("u1".to_string());
        let mut outer = Group::new(tenant.uuid.clone(), "outer", "acme");
        outer.groups.push(inner.uuid.clone());

        catalog.add_group(inner.clone());
        catalog.add_group(outer.clone());

        let closure = subject_group_closure(&catalog, &SubjectRef::user("u1"));
        assert!(closure.contains(&inner.uuid));
        assert!(closure.contains(&outer.uuid));
    }

    #[test]
    fn test_group_cycle_terminates() {
        let (mut catalog, tenant) = catalog_with_tenant("acme");

        let mut a = Group::new(tenant.uuid.clone(), "a", "acme");
        let mut b = Group::new(tenant.uuid.clone(), "b", "acme");
        a.users.push("u1".to_string());
        a.groups.push(b.uuid.clone());
        b.groups.push(a.uuid.clone());

        let a_uuid = a.uuid.clone();
        let b_uuid = b.uuid.clone();
        catalog.add_group(a);
        catalog.add_group(b);

        let closure = subject_group_closure(&catalog, &SubjectRef::user("u1"));
        assert!(closure.contains(&a_uuid));
        assert!(closure.contains(&b_uuid));
    }

    #[test]
    fn test_archived_group_does_not_contribute() {
        let (mut catalog, tenant) = catalog_with_tenant("acme");

        let mut dead = Group::new(tenant.uuid.clone(), "dead", "acme");
        dead.users.push("u1".to_string());
        dead.archive_mark = ArchiveMark::new(1_700_000_000, 1);
        catalog.add_group(dead);

        let closure = subject_group_closure(&catalog, &SubjectRef::user("u1"));
        assert!(closure.is_empty());
    }

    #[test]
    fn test_foreign_group_needs_sharing() {
        let (mut catalog, home) = catalog_with_tenant("acme");
        let away = Tenant::new("globex");
        catalog.add_tenant(away.clone());

        let mut foreign = Group::new(home.uuid.clone(), "ops", "acme");
        foreign.users.push("u1".to_string());
        catalog.add_group(foreign.clone());

        let closure = subject_group_closure(&catalog, &SubjectRef::user("u1"));

        // no sharing: the group is invisible inside globex
        let effective = groups_effective_in_tenant(&catalog, &closure, &away.uuid);
        assert!(effective.is_empty());

        // with a sharing listing the group it counts
        catalog.add_sharing(IdentitySharing::new(
            home.uuid.clone(),
            away.uuid.clone(),
            vec![foreign.uuid.clone()],
        ));
        let effective = groups_effective_in_tenant(&catalog, &closure, &away.uuid);
        assert!(effective.contains(&foreign.uuid));
    }

    #[test]
    fn test_subject_matches_direct_and_group_members() {
        let subject = SubjectRef::user("u1");
        let mut effective = HashSet::new();

        let members = vec![Member::user("u1")];
        assert!(subject_matches_members(&subject, &members, &effective));

        let members = vec![Member::service_account("u1")];
        assert!(!subject_matches_members(&subject, &members, &effective));

        let members = vec![Member::group("g1")];
        assert!(!subject_matches_members(&subject, &members, &effective));
        effective.insert("g1".to_string());
        assert!(subject_matches_members(&subject, &members, &effective));
    }
}

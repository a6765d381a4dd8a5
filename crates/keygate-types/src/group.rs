//! group type - a named set of subjects and nested groups.

use serde::{Deserialize, Serialize};

use crate::{
    ArchiveMark, GroupUuid, ServiceAccountUuid, SubjectKind, SubjectRef, TenantUuid, UserUuid,
    new_resource_version, new_uuid,
};

/// a group of subjects inside a tenant.
///
/// groups nest: a group may contain other groups, including groups from
/// other tenants. membership resolution walks the parent closure upward,
/// so a subject is a member of every group that transitively contains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// immutable unique id.
    pub uuid: GroupUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// human-readable identifier, unique within the tenant.
    pub identifier: String,

    /// derived globally unique identifier (`<identifier>@group.<tenant identifier>`).
    pub full_identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// directly contained users.
    #[serde(default)]
    pub users: Vec<UserUuid>,

    /// directly contained service accounts.
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccountUuid>,

    /// directly contained groups.
    #[serde(default)]
    pub groups: Vec<GroupUuid>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Group {
    /// create a new empty active group.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        identifier: impl Into<String>,
        tenant_identifier: &str,
    ) -> Self {
        let identifier = identifier.into();
        let full_identifier = format!("{}@group.{}", identifier, tenant_identifier);
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            identifier,
            full_identifier,
            version: new_resource_version(),
            users: Vec::new(),
            service_accounts: Vec::new(),
            groups: Vec::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }

    /// true if the subject is a direct member of this group.
    pub fn contains_subject(&self, subject: &SubjectRef) -> bool {
        match subject.kind {
            SubjectKind::User => self.users.iter().any(|u| *u == subject.uuid),
            SubjectKind::ServiceAccount => {
                self.service_accounts.iter().any(|sa| *sa == subject.uuid)
            }
        }
    }

    /// true if the given group is a direct member of this group.
    pub fn contains_group(&self, group_uuid: &str) -> bool {
        self.groups.iter().any(|g| g == group_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_membership() {
        let mut group = Group::new("t1", "devs", "acme");
        group.users.push("u1".to_string());
        group.groups.push("g2".to_string());

        assert!(group.contains_subject(&SubjectRef::user("u1")));
        assert!(!group.contains_subject(&SubjectRef::service_account("u1")));
        assert!(group.contains_group("g2"));
        assert!(!group.contains_group("g3"));
    }
}

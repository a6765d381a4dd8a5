//! role bindings: the edges that attach roles to members.

use serde::{Deserialize, Serialize};

use crate::{
    ArchiveMark, ProjectUuid, RoleBindingUuid, RoleName, SubjectKind, SubjectRef, TenantUuid,
    new_resource_version, new_uuid,
};

/// the kind of a role-binding member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// a human user.
    User,
    /// a machine service account.
    ServiceAccount,
    /// a group of subjects.
    Group,
}

/// one member of a role binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// whether this member is a user, service account or group.
    pub kind: MemberKind,
    /// uuid of the member.
    pub uuid: String,
}

impl Member {
    /// a user member.
    pub fn user(uuid: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::User,
            uuid: uuid.into(),
        }
    }

    /// a service account member.
    pub fn service_account(uuid: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::ServiceAccount,
            uuid: uuid.into(),
        }
    }

    /// a group member.
    pub fn group(uuid: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Group,
            uuid: uuid.into(),
        }
    }

    /// the subject reference for non-group members, if applicable.
    pub fn as_subject(&self) -> Option<SubjectRef> {
        match self.kind {
            MemberKind::User => Some(SubjectRef {
                kind: SubjectKind::User,
                uuid: self.uuid.clone(),
            }),
            MemberKind::ServiceAccount => Some(SubjectRef {
                kind: SubjectKind::ServiceAccount,
                uuid: self.uuid.clone(),
            }),
            MemberKind::Group => None,
        }
    }
}

/// a role carried by a binding, with its per-binding options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundRole {
    /// global role name.
    pub name: RoleName,
    /// options object validated against the role's schema.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl BoundRole {
    /// bind a role with empty options.
    pub fn new(name: impl Into<RoleName>) -> Self {
        Self {
            name: name.into(),
            options: serde_json::Map::new(),
        }
    }
}

/// a role binding: members get roles within a tenant's scope.
///
/// project scoping is either an explicit project list or `any_project`,
/// which covers projects created after the binding too. `valid_till` of 0
/// means the binding never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleBinding {
    /// immutable unique id.
    pub uuid: RoleBindingUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// human-readable identifier, unique within the tenant.
    #[serde(default)]
    pub identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// users, service accounts and groups this binding applies to.
    #[serde(default)]
    pub members: Vec<Member>,

    /// roles (with options) this binding grants.
    #[serde(default)]
    pub roles: Vec<BoundRole>,

    /// explicit project scope; ignored when `any_project` is set.
    #[serde(default)]
    pub projects: Vec<ProjectUuid>,

    /// true if the binding covers every project of the tenant.
    #[serde(default)]
    pub any_project: bool,

    /// unix timestamp after which the binding is inert; 0 = no expiry.
    #[serde(default)]
    pub valid_till: i64,

    /// true if use of the granted roles should demand a second factor.
    #[serde(default)]
    pub require_mfa: bool,

    /// which system wrote this binding (e.g. "iam", "flow").
    #[serde(default)]
    pub origin: String,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl RoleBinding {
    /// create a new active binding with no members, roles or projects.
    pub fn new(tenant_uuid: impl Into<TenantUuid>, identifier: impl Into<String>) -> Self {
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            identifier: identifier.into(),
            version: new_resource_version(),
            members: Vec::new(),
            roles: Vec::new(),
            projects: Vec::new(),
            any_project: false,
            valid_till: 0,
            require_mfa: false,
            origin: String::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }

    /// true if the binding is expired at the given unix time.
    pub fn expired_at(&self, now: i64) -> bool {
        self.valid_till != 0 && self.valid_till <= now
    }

    /// true if the binding covers the given project.
    pub fn covers_project(&self, project_uuid: &str) -> bool {
        self.any_project || self.projects.iter().any(|p| p == project_uuid)
    }
}

/// a pending approval attached to a role binding.
///
/// approvals record who still has to sign off on a binding; they do not
/// gate resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleBindingApproval {
    /// immutable unique id.
    pub uuid: String,

    /// binding this approval belongs to.
    pub role_binding_uuid: RoleBindingUuid,

    /// owning tenant (same as the binding's).
    pub tenant_uuid: TenantUuid,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// subjects and groups that may approve.
    #[serde(default)]
    pub approvers: Vec<Member>,

    /// how many distinct approvals are needed.
    #[serde(default)]
    pub required_votes: i64,

    /// whether the requesting subject's own vote counts.
    #[serde(default)]
    pub require_unanimity: bool,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl RoleBindingApproval {
    /// create a new active approval for a binding.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        role_binding_uuid: impl Into<RoleBindingUuid>,
    ) -> Self {
        Self {
            uuid: new_uuid(),
            role_binding_uuid: role_binding_uuid.into(),
            tenant_uuid: tenant_uuid.into(),
            version: new_resource_version(),
            approvers: Vec::new(),
            required_votes: 0,
            require_unanimity: false,
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let mut rb = RoleBinding::new("t1", "rb1");
        assert!(!rb.expired_at(1_700_000_000));

        rb.valid_till = 1_600_000_000;
        assert!(rb.expired_at(1_700_000_000));
        assert!(!rb.expired_at(1_500_000_000));
    }

    #[test]
    fn test_project_coverage() {
        let mut rb = RoleBinding::new("t1", "rb1");
        rb.projects.push("p1".to_string());
        assert!(rb.covers_project("p1"));
        assert!(!rb.covers_project("p2"));

        rb.any_project = true;
        assert!(rb.covers_project("p2"));
    }

    #[test]
    fn test_member_as_subject() {
        assert!(Member::group("g1").as_subject().is_none());
        let subject = Member::user("u1").as_subject().unwrap();
        assert_eq!(subject.kind, SubjectKind::User);
        assert_eq!(subject.uuid, "u1");
    }
}

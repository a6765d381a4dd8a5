//! multipasses: long-lived renewable credentials.

use serde::{Deserialize, Serialize};

use crate::{ArchiveMark, MultipassUuid, TenantUuid, new_resource_version, new_uuid};

/// the kind of principal a multipass is issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipassOwnerType {
    /// issued to a user.
    User,
    /// issued to a service account.
    ServiceAccount,
}

/// a multipass: a renewable long-lived credential bound to an owner.
///
/// the signed token itself is never stored; only its `jti` (salt) is kept
/// so a presented token can be checked against the current issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Multipass {
    /// immutable unique id, also the token subject.
    pub uuid: MultipassUuid,

    /// tenant of the owner.
    pub tenant_uuid: TenantUuid,

    /// kind of the owner.
    pub owner_type: MultipassOwnerType,

    /// uuid of the owning user or service account.
    pub owner_uuid: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// total lifetime in seconds.
    pub ttl_seconds: i64,

    /// maximum single-use validity in seconds.
    pub max_ttl_seconds: i64,

    /// free-form description for operators.
    #[serde(default)]
    pub description: String,

    /// cidrs the credential may be used from; empty means unrestricted.
    #[serde(default)]
    pub allowed_cidrs: Vec<String>,

    /// roles usable through this credential; empty means all granted roles.
    #[serde(default)]
    pub allowed_roles: Vec<String>,

    /// unix timestamp when the multipass stops being renewable.
    pub valid_till: i64,

    /// jti of the currently valid token issue; rotated on prolong.
    #[serde(default)]
    pub salt: String,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Multipass {
    /// create a new active multipass; the salt is set when a token is issued.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        owner_type: MultipassOwnerType,
        owner_uuid: impl Into<String>,
        ttl_seconds: i64,
        max_ttl_seconds: i64,
        valid_till: i64,
    ) -> Self {
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            owner_type,
            owner_uuid: owner_uuid.into(),
            version: new_resource_version(),
            ttl_seconds,
            max_ttl_seconds,
            description: String::new(),
            allowed_cidrs: Vec::new(),
            allowed_roles: Vec::new(),
            valid_till,
            salt: String::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

//! tenant type - the top-level ownership domain.

use serde::{Deserialize, Serialize};

use crate::{ArchiveMark, TenantUuid, new_resource_version, new_uuid};

/// a tenant: the root of the ownership hierarchy.
///
/// every project, subject, group, role binding and server belongs to
/// exactly one tenant. tenants are archived (soft-deleted), never
/// physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// immutable unique id.
    pub uuid: TenantUuid,

    /// human-readable identifier, unique across the system.
    pub identifier: String,

    /// opaque optimistic-concurrency token, regenerated on every mutation.
    pub version: String,

    /// feature flags enabled for this tenant.
    #[serde(default)]
    pub feature_flags: Vec<String>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Tenant {
    /// create a new active tenant with a fresh uuid and version.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            uuid: new_uuid(),
            identifier: identifier.into(),
            version: new_resource_version(),
            feature_flags: Vec::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

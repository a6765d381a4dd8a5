//! identity sharing between tenants.

use serde::{Deserialize, Serialize};

use crate::{ArchiveMark, GroupUuid, TenantUuid, new_resource_version, new_uuid};

/// a grant of visibility from one tenant's groups into another tenant.
///
/// when a sharing exists, the listed source groups (and, through the
/// parent closure, the subjects they contain) count as members inside the
/// destination tenant for role-binding resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySharing {
    /// immutable unique id.
    pub uuid: String,

    /// tenant whose groups are being shared.
    pub source_tenant_uuid: TenantUuid,

    /// tenant that gains visibility.
    pub destination_tenant_uuid: TenantUuid,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// groups shared into the destination tenant.
    #[serde(default)]
    pub groups: Vec<GroupUuid>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl IdentitySharing {
    /// create a new active sharing between two tenants.
    pub fn new(
        source_tenant_uuid: impl Into<TenantUuid>,
        destination_tenant_uuid: impl Into<TenantUuid>,
        groups: Vec<GroupUuid>,
    ) -> Self {
        Self {
            uuid: new_uuid(),
            source_tenant_uuid: source_tenant_uuid.into(),
            destination_tenant_uuid: destination_tenant_uuid.into(),
            version: new_resource_version(),
            groups,
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

//! project type - a scoping unit inside a tenant.

use serde::{Deserialize, Serialize};

use crate::{ArchiveMark, ProjectUuid, TenantUuid, new_resource_version, new_uuid};

/// a project inside a tenant.
///
/// project-scoped role bindings grant access to a subset of a tenant's
/// projects (or all of them via `any_project`). projects support explicit
/// restore after archiving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// immutable unique id.
    pub uuid: ProjectUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// human-readable identifier, unique within the tenant.
    pub identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Project {
    /// create a new active project with a fresh uuid and version.
    pub fn new(tenant_uuid: impl Into<TenantUuid>, identifier: impl Into<String>) -> Self {
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            identifier: identifier.into(),
            version: new_resource_version(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

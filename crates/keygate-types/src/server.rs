//! registered servers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ArchiveMark, MultipassUuid, ProjectUuid, ServerUuid, TenantUuid, new_resource_version,
    new_uuid,
};

/// how to reach a server over ssh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// hostname or address to connect to.
    #[serde(default)]
    pub hostname: String,
    /// ssh port; empty means the default.
    #[serde(default)]
    pub port: String,
    /// optional jump host.
    #[serde(default)]
    pub jump_hostname: String,
    /// jump host port.
    #[serde(default)]
    pub jump_port: String,
}

/// a server registered under a tenant and project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// immutable unique id.
    pub uuid: ServerUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// owning project.
    pub project_uuid: ProjectUuid,

    /// human-readable identifier, unique within the project.
    pub identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// selector labels attached at registration or update.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// free-form annotations, not used for selection.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// ssh connectivity details.
    #[serde(default)]
    pub connection_info: ConnectionInfo,

    /// multipass this server authenticates with, if registered.
    #[serde(default)]
    pub multipass_uuid: MultipassUuid,

    /// fingerprint of the server's host key.
    #[serde(default)]
    pub fingerprint: String,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl Server {
    /// create a new active server.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        project_uuid: impl Into<ProjectUuid>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            project_uuid: project_uuid.into(),
            identifier: identifier.into(),
            version: new_resource_version(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            connection_info: ConnectionInfo::default(),
            multipass_uuid: String::new(),
            fingerprint: String::new(),
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

//! ssh-identity materialization: server queries and posix accounts.
//!
//! a server that trusts this directory asks two questions: "which
//! servers match this query" (for discovery and jump-host setup) and
//! "which posix accounts should exist on me". both answers are derived
//! on demand; nothing posix-shaped is persisted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha_crypt::{ROUNDS_DEFAULT, Sha512Params, sha512_crypt_b64};
use tracing::debug;

use keygate_types::{Server, ServerAccessExtension};

use crate::error::{Error, Result};
use crate::informer::Directory;
use crate::selector::LabelSelector;

/// posix gid shared by all materialized accounts.
const POSIX_GID: i64 = 999;

/// login shell for materialized accounts.
const POSIX_SHELL: &str = "/bin/bash";

/// the scope of a server query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// across every tenant the caller can see.
    Global,
    /// within one tenant.
    Tenant(String),
    /// within one project of one tenant.
    TenantProject(String, String),
}

impl QueryScope {
    fn covers(&self, server: &Server) -> bool {
        match self {
            QueryScope::Global => true,
            QueryScope::Tenant(tenant) => server.tenant_uuid == *tenant,
            QueryScope::TenantProject(tenant, project) => {
                server.tenant_uuid == *tenant && server.project_uuid == *project
            }
        }
    }
}

/// find servers matching a query.
///
/// `names` and `selector` are mutually exclusive. name filtering only
/// makes sense inside a project, so outside project scope the name list
/// is cleared before the exclusivity check, mirroring how identifiers
/// are only unique per project. names match case-insensitively; each
/// name with no match produces a warning instead of failing the query.
///
/// outside project scope the returned servers are reduced to their safe
/// subset: connection details, annotations and credentials are cleared.
pub fn query_servers(
    dir: &dyn Directory,
    scope: &QueryScope,
    names: &[String],
    selector: Option<&LabelSelector>,
) -> Result<(Vec<Server>, Vec<String>)> {
    let project_scoped = matches!(scope, QueryScope::TenantProject(_, _));
    let names: &[String] = if project_scoped { names } else { &[] };

    if !names.is_empty() && selector.is_some() {
        return Err(Error::NamesAndSelector);
    }

    let candidates: Vec<&Server> = dir
        .servers()
        .iter()
        .filter(|s| s.archive_mark.is_active() && scope.covers(s))
        .collect();

    let mut warnings = Vec::new();
    let selected: Vec<&Server> = if !names.is_empty() {
        let mut found = Vec::new();
        for name in names {
            match candidates
                .iter()
                .find(|s| s.identifier.eq_ignore_ascii_case(name))
            {
                Some(server) => found.push(*server),
                None => warnings.push(format!("Server: {:?} not found", name)),
            }
        }
        found
    } else if let Some(selector) = selector {
        candidates
            .into_iter()
            .filter(|s| selector.matches(&s.labels))
            .collect()
    } else {
        candidates
    };

    debug!(count = selected.len(), "server query resolved");
    let servers = selected
        .into_iter()
        .map(|s| {
            if project_scoped {
                s.clone()
            } else {
                safe_server(s)
            }
        })
        .collect();
    Ok((servers, warnings))
}

// strip everything a caller without project scope has no business seeing
fn safe_server(server: &Server) -> Server {
    let mut safe = server.clone();
    safe.annotations.clear();
    safe.connection_info = Default::default();
    safe.multipass_uuid = String::new();
    safe.fingerprint = String::new();
    safe
}

/// a posix account materialized for one subject on one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixUser {
    /// login name.
    pub name: String,
    /// numeric uid.
    pub uid: i64,
    /// numeric gid.
    pub gid: i64,
    /// home directory path.
    pub home_dir: String,
    /// crypt(3) password hash.
    pub password: String,
    /// login shell.
    pub shell: String,
    /// gecos field.
    pub gecos: String,
    /// ssh certificate principal for this subject on this server.
    pub principal: String,
}

/// the ssh certificate principal of a subject on a server.
///
/// sha-256 over the concatenated server and subject uuids, hex encoded.
pub fn principal(server_uuid: &str, subject_uuid: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(server_uuid.as_bytes());
    hasher.update(subject_uuid.as_bytes());
    hex::encode(hasher.finalize())
}

/// build the posix account of one subject on one server.
///
/// the account name and home directory depend on whether the subject
/// lives in the server's tenant: foreign subjects get their full
/// identifier as the login name and a home directory namespaced by their
/// tenant uuid. returns `None` when the extension has no uid or no
/// password yet; such subjects are not materialized.
pub fn posix_user(
    server: &Server,
    subject_tenant_uuid: &str,
    subject_uuid: &str,
    identifier: &str,
    full_identifier: &str,
    extension: &ServerAccessExtension,
) -> Result<Option<PosixUser>> {
    let Some(uid) = extension.uid else {
        return Ok(None);
    };
    let Some(password) = extension.last_password() else {
        return Ok(None);
    };

    let same_tenant = subject_tenant_uuid == server.tenant_uuid;
    let (name, home_dir) = if same_tenant {
        (identifier.to_string(), format!("/home/{}", identifier))
    } else {
        (
            full_identifier.to_string(),
            format!("/home/{}/{}", subject_tenant_uuid, identifier),
        )
    };

    Ok(Some(PosixUser {
        name,
        uid,
        gid: POSIX_GID,
        home_dir,
        password: crypt_password(&server.uuid, &password.salt)?,
        shell: POSIX_SHELL.to_string(),
        gecos: String::new(),
        principal: principal(&server.uuid, subject_uuid),
    }))
}

/// all posix accounts that should exist on a server.
///
/// scans the subjects of the server's own tenant; subjects without a
/// populated server-access extension are skipped with a warning so the
/// agent's log shows why an expected account is missing.
pub fn resolve_posix_users(
    dir: &dyn Directory,
    server_uuid: &str,
) -> Result<(Vec<PosixUser>, Vec<String>)> {
    let Some(server) = dir.server(server_uuid) else {
        return Ok((Vec::new(), vec![format!("server {:?} not found", server_uuid)]));
    };

    let mut users = Vec::new();
    let mut warnings = Vec::new();

    for user in dir.users_of_tenant(&server.tenant_uuid) {
        if user.archive_mark.is_archived() {
            continue;
        }
        let Some(extension) = &user.server_access else {
            continue;
        };
        match posix_user(
            server,
            &user.tenant_uuid,
            &user.uuid,
            &user.identifier,
            &user.full_identifier,
            extension,
        )? {
            Some(posix) => users.push(posix),
            None => warnings.push(format!(
                "user {:?} has no allocated uid or password",
                user.identifier
            )),
        }
    }

    for sa in dir.service_accounts_of_tenant(&server.tenant_uuid) {
        if sa.archive_mark.is_archived() {
            continue;
        }
        let Some(extension) = &sa.server_access else {
            continue;
        };
        match posix_user(
            server,
            &sa.tenant_uuid,
            &sa.uuid,
            &sa.identifier,
            &sa.full_identifier,
            extension,
        )? {
            Some(posix) => users.push(posix),
            None => warnings.push(format!(
                "service account {:?} has no allocated uid or password",
                sa.identifier
            )),
        }
    }

    Ok((users, warnings))
}

// sha512-crypt of the server uuid under the subject's current salt, in
// standard `$6$salt$hash` form so it can go straight into /etc/shadow
fn crypt_password(server_uuid: &str, salt: &str) -> Result<String> {
    let params =
        Sha512Params::new(ROUNDS_DEFAULT).map_err(|e| Error::PasswordHash(format!("{:?}", e)))?;
    let hash = sha512_crypt_b64(server_uuid.as_bytes(), salt.as_bytes(), &params)
        .map_err(|e| Error::PasswordHash(format!("{:?}", e)))?;
    Ok(format!("$6${}${}", salt, hash))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use keygate_types::{PasswordEntry, Project, Tenant, User};

    use super::*;
    use crate::informer::SnapshotCatalog;

    fn extension(uid: i64) -> ServerAccessExtension {
        ServerAccessExtension {
            uid: Some(uid),
            passwords: vec![PasswordEntry {
                seed: vec![1, 2, 3],
                salt: "abcdefgh".to_string(),
                valid_till: 0,
            }],
        }
    }

    struct Fixture {
        catalog: SnapshotCatalog,
        tenant: Tenant,
        project: Project,
        server: Server,
    }

    fn fixture() -> Fixture {
        let mut catalog = SnapshotCatalog::new();
        let tenant = Tenant::new("acme");
        let project = Project::new(tenant.uuid.clone(), "web");
        let server = Server::new(tenant.uuid.clone(), project.uuid.clone(), "db-1");
        catalog.add_tenant(tenant.clone());
        catalog.add_project(project.clone());
        catalog.add_server(server.clone());
        Fixture {
            catalog,
            tenant,
            project,
            server,
        }
    }

    #[test]
    fn test_principal_is_stable_and_distinct() {
        let a = principal("srv", "subj");
        assert_eq!(a, principal("srv", "subj"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, principal("srv", "other"));
        assert_ne!(a, principal("other", "subj"));
    }

    #[test]
    fn test_posix_user_same_tenant() {
        let f = fixture();
        let ext = extension(2000);
        let posix = posix_user(&f.server, &f.tenant.uuid, "u1", "vasya", "vasya@acme", &ext)
            .unwrap()
            .unwrap();
        assert_eq!(posix.name, "vasya");
        assert_eq!(posix.home_dir, "/home/vasya");
        assert_eq!(posix.uid, 2000);
        assert_eq!(posix.gid, POSIX_GID);
        assert_eq!(posix.shell, "/bin/bash");
        assert!(posix.password.starts_with("$6$abcdefgh$"));
    }

    #[test]
    fn test_posix_user_cross_tenant() {
        let f = fixture();
        let ext = extension(2001);
        let posix = posix_user(&f.server, "other-tenant", "u2", "petya", "petya@globex", &ext)
            .unwrap()
            .unwrap();
        assert_eq!(posix.name, "petya@globex");
        assert_eq!(posix.home_dir, "/home/other-tenant/petya");
    }

    #[test]
    fn test_posix_user_requires_uid_and_password() {
        let f = fixture();
        let empty = ServerAccessExtension::default();
        assert!(
            posix_user(&f.server, &f.tenant.uuid, "u1", "vasya", "vasya@acme", &empty)
                .unwrap()
                .is_none()
        );

        let no_password = ServerAccessExtension {
            uid: Some(2000),
            passwords: vec![],
        };
        assert!(
            posix_user(&f.server, &f.tenant.uuid, "u1", "vasya", "vasya@acme", &no_password)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_resolve_posix_users_warns_on_unallocated() {
        let mut f = fixture();
        let mut ready = User::new(f.tenant.uuid.clone(), "vasya", "acme");
        ready.server_access = Some(extension(2000));
        let mut pending = User::new(f.tenant.uuid.clone(), "petya", "acme");
        pending.server_access = Some(ServerAccessExtension::default());
        // no extension at all: skipped silently
        let plain = User::new(f.tenant.uuid.clone(), "masha", "acme");

        f.catalog.add_user(ready);
        f.catalog.add_user(pending);
        f.catalog.add_user(plain);

        let (users, warnings) = resolve_posix_users(&f.catalog, &f.server.uuid).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "vasya");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("petya"));
    }

    fn server_with_labels(f: &Fixture, identifier: &str, labels: &[(&str, &str)]) -> Server {
        let mut server = Server::new(f.tenant.uuid.clone(), f.project.uuid.clone(), identifier);
        server.labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        server
    }

    #[test]
    fn test_query_by_names_case_insensitive_with_warning() {
        let mut f = fixture();
        f.catalog
            .add_server(server_with_labels(&f, "Web-1", &[]));

        let scope = QueryScope::TenantProject(f.tenant.uuid.clone(), f.project.uuid.clone());
        let names = vec!["web-1".to_string(), "gone".to_string()];
        let (servers, warnings) = query_servers(&f.catalog, &scope, &names, None).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].identifier, "Web-1");
        assert_eq!(warnings, vec!["Server: \"gone\" not found".to_string()]);
    }

    #[test]
    fn test_names_and_selector_mutually_exclusive() {
        let f = fixture();
        let scope = QueryScope::TenantProject(f.tenant.uuid.clone(), f.project.uuid.clone());
        let selector = LabelSelector::parse("env=prod").unwrap();
        let err = query_servers(
            &f.catalog,
            &scope,
            &["db-1".to_string()],
            Some(&selector),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "only names or labelSelector must be set");
    }

    #[test]
    fn test_names_cleared_outside_project_scope() {
        let f = fixture();
        // with names and a selector but no project scope, names are dropped
        // first, so this is a plain selector query rather than an error
        let selector = LabelSelector::parse("").unwrap();
        let scope = QueryScope::Tenant(f.tenant.uuid.clone());
        let (servers, warnings) = query_servers(
            &f.catalog,
            &scope,
            &["db-1".to_string()],
            Some(&selector),
        )
        .unwrap();
        assert_eq!(servers.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_selector_query() {
        let mut f = fixture();
        f.catalog
            .add_server(server_with_labels(&f, "web-1", &[("env", "prod")]));
        f.catalog
            .add_server(server_with_labels(&f, "web-2", &[("env", "stage")]));

        let scope = QueryScope::TenantProject(f.tenant.uuid.clone(), f.project.uuid.clone());
        let selector = LabelSelector::parse("env=prod").unwrap();
        let (servers, _) = query_servers(&f.catalog, &scope, &[], Some(&selector)).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].identifier, "web-1");
    }

    #[test]
    fn test_safe_reduction_outside_project_scope() {
        let mut f = fixture();
        let mut server = server_with_labels(&f, "web-1", &[("env", "prod")]);
        server.connection_info.hostname = "web-1.internal".to_string();
        server.fingerprint = "SHA256:abc".to_string();
        server.multipass_uuid = "mp-1".to_string();
        server
            .annotations
            .insert("note".to_string(), "secret".to_string());
        f.catalog.add_server(server);

        let (servers, _) =
            query_servers(&f.catalog, &QueryScope::Global, &[], None).unwrap();
        let reduced = servers.iter().find(|s| s.identifier == "web-1").unwrap();
        assert!(reduced.connection_info.hostname.is_empty());
        assert!(reduced.fingerprint.is_empty());
        assert!(reduced.multipass_uuid.is_empty());
        assert!(reduced.annotations.is_empty());
        // labels survive: they are the query surface
        assert_eq!(reduced.labels["env"], "prod");

        let scope = QueryScope::TenantProject(f.tenant.uuid.clone(), f.project.uuid.clone());
        let (servers, _) = query_servers(&f.catalog, &scope, &[], None).unwrap();
        let full = servers.iter().find(|s| s.identifier == "web-1").unwrap();
        assert_eq!(full.connection_info.hostname, "web-1.internal");
    }

    #[test]
    fn test_archived_server_never_returned() {
        let mut f = fixture();
        let mut dead = server_with_labels(&f, "old-1", &[]);
        dead.archive_mark = keygate_types::ArchiveMark::new(1_700_000_000, 3);
        f.catalog.add_server(dead);

        let (servers, _) =
            query_servers(&f.catalog, &QueryScope::Global, &[], None).unwrap();
        assert!(servers.iter().all(|s| s.identifier != "old-1"));
    }

    #[test]
    fn test_crypt_password_format() {
        let hash = crypt_password("server-uuid", "saltsalt").unwrap();
        assert!(hash.starts_with("$6$saltsalt$"));
        // deterministic for the same inputs
        assert_eq!(hash, crypt_password("server-uuid", "saltsalt").unwrap());
        assert_ne!(hash, crypt_password("other-uuid", "saltsalt").unwrap());
    }
}

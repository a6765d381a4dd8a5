//! subjects: users and service accounts, plus the server-access extension.

use serde::{Deserialize, Serialize};

use crate::{
    ArchiveMark, ServiceAccountUuid, TenantUuid, UserUuid, new_resource_version, new_uuid,
};

/// the kind of a subject referenced by membership or ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// a human user.
    User,
    /// a machine service account.
    ServiceAccount,
}

/// a reference to a subject (user or service account) by kind and uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    /// whether this references a user or a service account.
    pub kind: SubjectKind,
    /// uuid of the referenced subject.
    pub uuid: String,
}

impl SubjectRef {
    /// reference a user by uuid.
    pub fn user(uuid: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::User,
            uuid: uuid.into(),
        }
    }

    /// reference a service account by uuid.
    pub fn service_account(uuid: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::ServiceAccount,
            uuid: uuid.into(),
        }
    }
}

/// one entry of the rotating posix password list.
///
/// the seed is never exposed; the salt feeds sha512-crypt when a posix
/// account is materialized for a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordEntry {
    /// random seed used to derive reveal-passwords.
    #[serde(default)]
    pub seed: Vec<u8>,
    /// crypt salt (16 chars max, `[a-zA-Z0-9./]`).
    pub salt: String,
    /// unix timestamp after which this entry is stale; 0 = unbounded.
    #[serde(default)]
    pub valid_till: i64,
}

/// typed `server_access` extension attached to users and service accounts.
///
/// decoded from the stored json at the store boundary so the resolution
/// core never handles untyped maps. a uid may legitimately be missing on
/// records written by older producers; the materializer skips such
/// subjects with a warning instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAccessExtension {
    /// allocated posix uid, strictly increasing per allocation.
    #[serde(default)]
    pub uid: Option<i64>,
    /// ordered password entries; the last one is current.
    #[serde(default)]
    pub passwords: Vec<PasswordEntry>,
}

impl ServerAccessExtension {
    /// the most recently appended password entry, if any.
    pub fn last_password(&self) -> Option<&PasswordEntry> {
        self.passwords.last()
    }
}

/// a human user inside a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// immutable unique id.
    pub uuid: UserUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// human-readable identifier, unique within the tenant.
    pub identifier: String,

    /// derived globally unique identifier (`<identifier>@<tenant identifier>`).
    pub full_identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// typed server-access extension, if populated.
    #[serde(default)]
    pub server_access: Option<ServerAccessExtension>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl User {
    /// create a new active user.
    ///
    /// `tenant_identifier` is used to derive the full identifier.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        identifier: impl Into<String>,
        tenant_identifier: &str,
    ) -> Self {
        let identifier = identifier.into();
        let full_identifier = full_user_identifier(&identifier, tenant_identifier);
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            identifier,
            full_identifier,
            version: new_resource_version(),
            server_access: None,
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

/// a machine service account inside a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    /// immutable unique id.
    pub uuid: ServiceAccountUuid,

    /// owning tenant.
    pub tenant_uuid: TenantUuid,

    /// human-readable identifier, unique within the tenant.
    pub identifier: String,

    /// derived globally unique identifier.
    pub full_identifier: String,

    /// opaque optimistic-concurrency token.
    pub version: String,

    /// typed server-access extension, if populated.
    #[serde(default)]
    pub server_access: Option<ServerAccessExtension>,

    /// soft-delete mark.
    #[serde(default)]
    pub archive_mark: ArchiveMark,
}

impl ServiceAccount {
    /// create a new active service account.
    pub fn new(
        tenant_uuid: impl Into<TenantUuid>,
        identifier: impl Into<String>,
        tenant_identifier: &str,
    ) -> Self {
        let identifier = identifier.into();
        let full_identifier = full_service_account_identifier(&identifier, tenant_identifier);
        Self {
            uuid: new_uuid(),
            tenant_uuid: tenant_uuid.into(),
            identifier,
            full_identifier,
            version: new_resource_version(),
            server_access: None,
            archive_mark: ArchiveMark::ACTIVE,
        }
    }
}

/// derive the globally unique identifier of a user.
pub fn full_user_identifier(identifier: &str, tenant_identifier: &str) -> String {
    format!("{}@{}", identifier, tenant_identifier)
}

/// derive the globally unique identifier of a service account.
pub fn full_service_account_identifier(identifier: &str, tenant_identifier: &str) -> String {
    format!("{}@serviceaccount.{}", identifier, tenant_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_identifiers() {
        let user = User::new("t1", "vasya", "acme");
        assert_eq!(user.full_identifier, "vasya@acme");

        let sa = ServiceAccount::new("t1", "deploy", "acme");
        assert_eq!(sa.full_identifier, "deploy@serviceaccount.acme");
    }

    #[test]
    fn test_extension_last_password() {
        let mut ext = ServerAccessExtension {
            uid: Some(2000),
            passwords: vec![],
        };
        assert!(ext.last_password().is_none());

        ext.passwords.push(PasswordEntry {
            seed: vec![1],
            salt: "old".to_string(),
            valid_till: 0,
        });
        ext.passwords.push(PasswordEntry {
            seed: vec![2],
            salt: "new".to_string(),
            valid_till: 0,
        });
        assert_eq!(ext.last_password().unwrap().salt, "new");
    }

    #[test]
    fn test_extension_decodes_without_uid() {
        // records written before uid allocation existed have no uid field
        let ext: ServerAccessExtension = serde_json::from_str(r#"{"passwords": []}"#).unwrap();
        assert!(ext.uid.is_none());
        assert!(ext.passwords.is_empty());
    }
}

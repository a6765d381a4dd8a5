//! sea-orm entities for keygate storage.

pub mod group;
pub mod identity_sharing;
pub mod multipass;
pub mod project;
pub mod role;
pub mod role_binding;
pub mod role_binding_approval;
pub mod server;
pub mod server_access_config;
pub mod service_account;
pub mod tenant;
pub mod user;

use keygate_types::ArchiveMark;

/// decode a json-array column, defaulting to empty on null.
pub(crate) fn decode_list<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Vec<T> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// encode a list to a json-array column, none if empty.
pub(crate) fn encode_list<T: serde::Serialize>(list: &[T]) -> Option<String> {
    if list.is_empty() {
        None
    } else {
        Some(serde_json::to_string(list).unwrap_or_default())
    }
}

/// build an archive mark from the two storage columns.
pub(crate) fn mark_from_columns(timestamp: i64, hash: i64) -> ArchiveMark {
    ArchiveMark::new(timestamp, hash)
}

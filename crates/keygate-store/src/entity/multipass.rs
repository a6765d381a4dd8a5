//! multipass entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use keygate_types::{Multipass, MultipassOwnerType};

use super::{decode_list, encode_list, mark_from_columns};

/// multipass database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "multipasses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: String,
    pub tenant_uuid: String,
    /// "user" or "service_account".
    pub owner_type: String,
    pub owner_uuid: String,
    pub version: String,
    pub ttl_seconds: i64,
    pub max_ttl_seconds: i64,
    pub description: String,
    /// allowed cidrs stored as json array string.
    pub allowed_cidrs: Option<String>,
    /// allowed roles stored as json array string.
    pub allowed_roles: Option<String>,
    pub valid_till: i64,
    pub salt: String,
    pub archiving_timestamp: i64,
    pub archiving_hash: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Multipass {
    fn from(model: Model) -> Self {
        let owner_type = match model.owner_type.as_str() {
            "service_account" => MultipassOwnerType::ServiceAccount,
            _ => MultipassOwnerType::User,
        };
        Multipass {
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            owner_type,
            owner_uuid: model.owner_uuid,
            version: model.version,
            ttl_seconds: model.ttl_seconds,
            max_ttl_seconds: model.max_ttl_seconds,
            description: model.description,
            allowed_cidrs: decode_list(model.allowed_cidrs.as_deref()),
            allowed_roles: decode_list(model.allowed_roles.as_deref()),
            valid_till: model.valid_till,
            salt: model.salt,
            archive_mark: mark_from_columns(model.archiving_timestamp, model.archiving_hash),
        }
    }
}

impl From<&Multipass> for ActiveModel {
    fn from(multipass: &Multipass) -> Self {
        let owner_type = match multipass.owner_type {
            MultipassOwnerType::User => "user",
            MultipassOwnerType::ServiceAccount => "service_account",
        };
        ActiveModel {
            uuid: Set(multipass.uuid.clone()),
            tenant_uuid: Set(multipass.tenant_uuid.clone()),
            owner_type: Set(owner_type.to_string()),
            owner_uuid: Set(multipass.owner_uuid.clone()),
            version: Set(multipass.version.clone()),
            ttl_seconds: Set(multipass.ttl_seconds),
            max_ttl_seconds: Set(multipass.max_ttl_seconds),
            description: Set(multipass.description.clone()),
            allowed_cidrs: Set(encode_list(&multipass.allowed_cidrs)),
            allowed_roles: Set(encode_list(&multipass.allowed_roles)),
            valid_till: Set(multipass.valid_till),
            salt: Set(multipass.salt.clone()),
            archiving_timestamp: Set(multipass.archive_mark.timestamp),
            archiving_hash: Set(multipass.archive_mark.hash),
        }
    }
}

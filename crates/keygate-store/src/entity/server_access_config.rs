//! server-access extension configuration, stored as a single row.

use sea_orm::entity::prelude::*;

/// server-access configuration model. a singleton row with id 1.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "server_access_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// role granted to registered servers.
    pub role_for_ssh_access: String,
    /// roles bound to a server's own service account on registration,
    /// stored as json array string.
    pub roles_for_servers: Option<String>,
    /// highest posix uid handed out so far.
    pub last_allocated_uid: i64,
    /// seconds after a reveal before a password seed expires.
    pub expire_password_seed_after_reveal_in: i64,
    /// seconds after expiry before stale seeds are deleted.
    pub delete_expired_password_seeds_after: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

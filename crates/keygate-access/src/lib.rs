//! role-binding resolution and ssh-identity materialization for keygate.
//!
//! this crate is the pure core: it answers "which effective roles does
//! this subject hold, where" and "which posix accounts exist on this
//! server" from an in-memory snapshot of the directory. it performs no
//! i/o; callers load a [`SnapshotCatalog`] (or implement [`Directory`]
//! themselves) and call the resolution functions.

#![warn(missing_docs)]

pub mod error;
pub mod informer;
pub mod materialize;
pub mod membership;
pub mod multipass;
pub mod resolver;
pub mod roles;
pub mod selector;

pub use error::{Error, OptionsError, Result, SchemaCompatError, SelectorParseError};
pub use informer::{Directory, SnapshotCatalog};
pub use materialize::{
    PosixUser, QueryScope, posix_user, principal, query_servers, resolve_posix_users,
};
pub use multipass::{MultipassClaims, MultipassService, TokenSigner, jti_matches};
pub use resolver::{EffectiveProject, EffectiveRole, EffectiveTenant, effective_roles};
pub use selector::{LabelSelector, Requirement};

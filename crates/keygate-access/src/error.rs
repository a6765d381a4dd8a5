//! error types for keygate-access.

use thiserror::Error;

/// errors that can occur during resolution and materialization.
#[derive(Debug, Error)]
pub enum Error {
    /// binding options do not satisfy the role's schema.
    #[error("check options for role {role:?}: {cause}")]
    RoleOptions {
        /// name of the role whose schema rejected the options.
        role: String,
        /// the specific schema violation.
        cause: OptionsError,
    },

    /// a referenced role does not exist.
    #[error("role {0:?} not found")]
    RoleNotFound(String),

    /// a role cannot be bound in a tenant missing its feature flags.
    #[error("role {role:?} requires one of feature flags {flags:?}")]
    FeatureFlagRequired {
        /// the role being bound.
        role: String,
        /// flags of which at least one must be enabled on the tenant.
        flags: Vec<String>,
    },

    /// a role update would break existing bindings.
    #[error("options schema is not backwards compatible: {0}")]
    SchemaCompat(#[from] SchemaCompatError),

    /// a server query mixed its two mutually exclusive filters.
    #[error("only names or labelSelector must be set")]
    NamesAndSelector,

    /// failed to parse a label selector.
    #[error("failed to parse label selector: {0}")]
    ParseSelector(#[from] SelectorParseError),

    /// failed to produce a crypt hash for a posix password.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// failed to sign or verify a multipass token.
    #[error("token signing failed: {0}")]
    TokenSign(String),

    /// a multipass is past its validity and cannot be prolonged.
    #[error("multipass {0:?} is no longer valid")]
    MultipassExpired(String),
}

/// violations of a role's options schema.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// a required option key is absent.
    #[error("required option {0:?} is missing")]
    MissingRequired(String),

    /// an option value has the wrong json type.
    #[error("option {key:?} must be a {expected}")]
    WrongType {
        /// the offending option key.
        key: String,
        /// the type the schema demands.
        expected: &'static str,
    },

    /// an option key is not declared in the schema.
    #[error("option {0:?} is not allowed")]
    UnknownKey(String),
}

/// ways a schema update can break existing bindings.
#[derive(Debug, Error)]
pub enum SchemaCompatError {
    /// the new schema requires a key the old one did not.
    #[error("new required option {0:?}")]
    NewRequirement(String),

    /// the new schema dropped a previously declared property.
    #[error("removed property {0:?}")]
    RemovedProperty(String),

    /// a property changed its declared type.
    #[error("property {0:?} changed type")]
    ChangedType(String),
}

/// parse errors for label selectors.
#[derive(Debug, Error)]
pub enum SelectorParseError {
    /// a requirement has no recognisable operator.
    #[error("unknown requirement format: {0}")]
    UnknownRequirement(String),

    /// an `in`/`notin` requirement is missing its value set.
    #[error("missing value set in: {0}")]
    MissingValueSet(String),

    /// a key or value is empty where one is required.
    #[error("empty key in requirement: {0}")]
    EmptyKey(String),
}

/// result type for keygate-access operations.
pub type Result<T> = std::result::Result<T, Error>;

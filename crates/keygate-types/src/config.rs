//! configuration types for keygate

use serde::{Deserialize, Serialize};

/// main configuration for keygate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// address to bind the http server to.
    pub listen_addr: String,

    /// database configuration.
    pub database: DatabaseConfig,

    /// multipass token signing configuration.
    pub token: TokenConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database: DatabaseConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/keygate/db.sqlite".to_string(),
        }
    }
}

/// multipass token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// hmac signing secret for issued multipass jwts.
    pub signing_secret: String,

    /// issuer claim placed in issued tokens.
    pub issuer: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            issuer: "keygate".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.db_type, "sqlite");
        assert!(!config.token.issuer.is_empty());
    }
}

// Runtime configuration
// Read from the environment (after loading .env) once at startup

use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "dev-secret-key";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// One year
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set together with BOOTSTRAP_ADMIN_PASSWORD")]
    IncompleteBootstrap(&'static str),
}

/// Credentials for an Admin account created at startup when missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Postgres connection string; in-memory storage when absent
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bind_addr: SocketAddr,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse("BIND_ADDR", bind_addr)?;

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse("DATABASE_MAX_CONNECTIONS", value)?,
            None => 5,
        };

        let token_ttl_hours: i64 = match var("TOKEN_TTL_HOURS") {
            Some(value) => parse("TOKEN_TTL_HOURS", value)?,
            None => 8,
        };
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
                reason: format!("must be between 1 and {}", MAX_TOKEN_TTL_HOURS),
            });
        }

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteBootstrap("BOOTSTRAP_ADMIN_EMAIL")),
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            max_connections,
            jwt_secret,
            token_ttl_hours,
            bind_addr,
            bootstrap_admin,
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.token_ttl_hours, 8);
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.bootstrap_admin, None);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgresql://localhost/teams"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "1"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@corp.io"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgresql://localhost/teams"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_hours, 1);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.bootstrap_admin,
            Some(BootstrapAdmin {
                email: "root@corp.io".to_string(),
                password: "changeme".to_string()
            })
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(matches!(
            config(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("TOKEN_TTL_HOURS", "0")]),
            Err(ConfigError::Invalid { name: "TOKEN_TTL_HOURS", .. })
        ));
    }

    #[test]
    fn token_lifetime_is_capped_at_one_year() {
        let cfg = config(&[("TOKEN_TTL_HOURS", "8760")]).unwrap();
        assert_eq!(cfg.token_ttl_hours, MAX_TOKEN_TTL_HOURS);

        for value in ["8761", "9223372036854775807"] {
            assert_eq!(
                config(&[("TOKEN_TTL_HOURS", value)]),
                Err(ConfigError::Invalid {
                    name: "TOKEN_TTL_HOURS",
                    value: value.to_string(),
                    reason: "must be between 1 and 8760".to_string(),
                })
            );
        }
    }

    #[test]
    fn bootstrap_needs_both_values() {
        assert!(matches!(
            config(&[("BOOTSTRAP_ADMIN_EMAIL", "root@corp.io")]),
            Err(ConfigError::IncompleteBootstrap(_))
        ));
    }
}

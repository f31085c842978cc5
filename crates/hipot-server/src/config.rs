//! Server configuration from environment variables

use rand::{distributions::Alphanumeric, Rng};
use std::env;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Configuration errors; reported at startup, never silently defaulted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where audit records and users are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// Lost on restart
    Memory,
    /// sqlx connection URL, e.g. `sqlite://hipot_logs.db`
    Sqlite(String),
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Runtime configuration for the log service
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database: DatabaseBackend,
    pub jwt_secret: Vec<u8>,
    /// `false` when the secret was generated for this process only
    pub jwt_secret_configured: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
    pub cors_origins: CorsOrigins,
    pub body_limit_bytes: usize,
    pub log_level: Level,
}

pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hipot_logs.db";
pub const DEFAULT_BODY_LIMIT_MB: usize = 50;

impl ServerConfig {
    /// Read configuration from `HIPOT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = parse_or("HIPOT_PORT", get("HIPOT_PORT"), DEFAULT_PORT)?;

        let database = match get("HIPOT_DATABASE_URL") {
            Some(url) if url.trim().eq_ignore_ascii_case("memory") => DatabaseBackend::Memory,
            Some(url) if url.starts_with("sqlite:") => DatabaseBackend::Sqlite(url),
            Some(url) => {
                return Err(ConfigError::Invalid {
                    name: "HIPOT_DATABASE_URL",
                    value: url,
                    reason: "expected 'memory' or a sqlite: URL".into(),
                })
            }
            None => DatabaseBackend::Sqlite(DEFAULT_DATABASE_URL.into()),
        };

        let (jwt_secret, jwt_secret_configured) = match get("HIPOT_JWT_SECRET") {
            Some(secret) => (secret.into_bytes(), true),
            None => (random_secret(), false),
        };

        let bcrypt_cost = parse_or("HIPOT_BCRYPT_COST", get("HIPOT_BCRYPT_COST"), 10u32)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "HIPOT_BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".into(),
            });
        }

        let cors_origins = match get("HIPOT_CORS_ORIGINS") {
            None => CorsOrigins::Any,
            Some(v) if v.trim() == "*" => CorsOrigins::Any,
            Some(v) => CorsOrigins::List(
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
            ),
        };

        let body_limit_mb = parse_or(
            "HIPOT_BODY_LIMIT_MB",
            get("HIPOT_BODY_LIMIT_MB"),
            DEFAULT_BODY_LIMIT_MB,
        )?;
        if body_limit_mb == 0 {
            return Err(ConfigError::Invalid {
                name: "HIPOT_BODY_LIMIT_MB",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            bind_addr: get("HIPOT_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database,
            jwt_secret,
            jwt_secret_configured,
            admin_username: get("HIPOT_ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            admin_password: get("HIPOT_ADMIN_PASSWORD").unwrap_or_else(|| "admin".into()),
            bcrypt_cost,
            cors_origins,
            body_limit_bytes: body_limit_mb * 1024 * 1024,
            log_level: parse_or("HIPOT_LOG_LEVEL", get("HIPOT_LOG_LEVEL"), Level::INFO)?,
        })
    }

    /// In-memory configuration for tests
    pub fn for_tests() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 0,
            database: DatabaseBackend::Memory,
            jwt_secret: b"test-secret".to_vec(),
            jwt_secret_configured: true,
            admin_username: "admin".into(),
            admin_password: "admin".into(),
            bcrypt_cost: 4,
            cors_origins: CorsOrigins::Any,
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
            log_level: Level::INFO,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("jwt_secret_configured", &self.jwt_secret_configured)
            .field("admin_username", &self.admin_username)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_origins", &self.cors_origins)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn random_secret() -> Vec<u8> {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(
            config.database,
            DatabaseBackend::Sqlite("sqlite://hipot_logs.db".into())
        );
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, "admin");
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
        assert_eq!(config.body_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.log_level, Level::INFO);
        assert!(!config.jwt_secret_configured);
        assert_eq!(config.jwt_secret.len(), 64);
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = config(&[]).unwrap();
        let b = config(&[]).unwrap();
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HIPOT_PORT", "8081"),
            ("HIPOT_DATABASE_URL", "memory"),
            ("HIPOT_JWT_SECRET", "s3cret"),
            ("HIPOT_CORS_ORIGINS", "http://localhost:5173, https://logs.example.com"),
            ("HIPOT_BODY_LIMIT_MB", "5"),
            ("HIPOT_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "0.0.0.0:8081");
        assert_eq!(config.database, DatabaseBackend::Memory);
        assert_eq!(config.jwt_secret, b"s3cret");
        assert!(config.jwt_secret_configured);
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![
                "http://localhost:5173".into(),
                "https://logs.example.com".into()
            ])
        );
        assert_eq!(config.body_limit_bytes, 5 * 1024 * 1024);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(matches!(
            config(&[("HIPOT_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "HIPOT_PORT", .. })
        ));
        assert!(matches!(
            config(&[("HIPOT_BCRYPT_COST", "2")]),
            Err(ConfigError::Invalid { name: "HIPOT_BCRYPT_COST", .. })
        ));
        assert!(matches!(
            config(&[("HIPOT_DATABASE_URL", "postgres://db")]),
            Err(ConfigError::Invalid { name: "HIPOT_DATABASE_URL", .. })
        ));
        assert!(matches!(
            config(&[("HIPOT_LOG_LEVEL", "loud")]),
            Err(ConfigError::Invalid { name: "HIPOT_LOG_LEVEL", .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = config(&[("HIPOT_JWT_SECRET", "s3cret"), ("HIPOT_ADMIN_PASSWORD", "hunter2")])
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hunter2"));
    }
}

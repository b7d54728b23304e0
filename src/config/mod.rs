//! Application configuration loaded from environment variables.
//!
//! The configuration is built once in `main` and shared through
//! [`crate::state::AppState`]. Secrets have no fallback values: a missing
//! `ADMIN_PASSWORD` or `JWT_SECRET` stops the server from starting.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CURRENCY: &str = "₽";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    /// Cookies only carry the `Secure` flag outside development.
    pub fn requires_https(self) -> bool {
        !matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub admin_password: SecretString,
    pub jwt_secret: SecretString,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Environment::parse(get("APP_ENV").as_deref());

        let host = match get("HOST") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("HOST", v))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database = DatabaseConfig {
            url: get("DATABASE_URL").map(SecretString::from),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 10)?,
            connection_timeout: parse_or("DATABASE_CONNECTION_TIMEOUT", get("DATABASE_CONNECTION_TIMEOUT"), 30)?,
        };

        let admin_password = get("ADMIN_PASSWORD").ok_or(ConfigError::MissingEnvVar("ADMIN_PASSWORD"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::MissingEnvVar("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_SECRET",
                format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
            ));
        }

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                static_dir: get("STATIC_DIR").map(PathBuf::from),
                cors_origins,
            },
            database,
            security: SecurityConfig {
                admin_password: SecretString::from(admin_password),
                jwt_secret: SecretString::from(jwt_secret),
                secure_cookies: environment.requires_https(),
            },
            catalog: CatalogConfig {
                currency: get("CATALOG_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            },
        })
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_ref()
            .map(|url| url.expose_secret())
            .ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidEnvVar(key, v)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_for_development() {
        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw"), ("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 3000);
        assert!(!config.security.secure_cookies);
        assert_eq!(config.catalog.currency, "₽");
        assert!(config.database_url().is_err());
    }

    #[test]
    fn production_enables_secure_cookies() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("ADMIN_PASSWORD", "pw"),
            ("JWT_SECRET", SECRET),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();
        assert!(config.security.secure_cookies);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins.len(), 2);
    }

    #[test]
    fn missing_secrets_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("ADMIN_PASSWORD")));

        let err = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("JWT_SECRET")));

        let err = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "  "), ("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("ADMIN_PASSWORD")));
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw"), ("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar("JWT_SECRET", _)));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("JWT_SECRET", SECRET),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar("PORT", _)));
    }
}

//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading with validation: required variables must be present
//! and valid or the process exits with a clear message. Production mode
//! refuses to start with the insecure default secrets key.

use std::env;
use thiserror::Error;

/// Default `SECRETS_ENCRYPTION_KEY`: 64 hex '4' characters. Development
/// only; production startup rejects it.
pub const INSECURE_SECRETS_KEY: &str =
    "4444444444444444444444444444444444444444444444444444444444444444";

/// Application environment mode.
///
/// Controls security enforcement behavior:
/// - `Development`: the insecure default key is allowed with WARN logging.
/// - `Production`: the insecure default key refuses startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse from the `APP_ENV` environment variable value.
    /// Defaults to `Development` if unset or unrecognized.
    #[must_use]
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    /// Returns true if this is production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Insecure SECRETS_ENCRYPTION_KEY in production mode; set a real 32-byte hex key")]
    InsecureKeyInProduction,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub rust_log: String,
    pub app_env: AppEnvironment,
    /// 32-byte key integration secrets are encrypted under at rest.
    pub secrets_key: Vec<u8>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{e}"),
            })?,
            Err(_) => 8080,
        };
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let app_env =
            AppEnvironment::from_env_str(&env::var("APP_ENV").unwrap_or_default());

        let key_hex = env::var("SECRETS_ENCRYPTION_KEY")
            .unwrap_or_else(|_| INSECURE_SECRETS_KEY.to_string());
        let secrets_key = parse_secrets_key(&key_hex)?;

        if key_hex == INSECURE_SECRETS_KEY {
            if app_env.is_production() {
                return Err(ConfigError::InsecureKeyInProduction);
            }
            tracing::warn!(
                target: "security",
                "Using the insecure default SECRETS_ENCRYPTION_KEY (allowed in development mode)"
            );
        }

        Ok(Self {
            host,
            port,
            database_url,
            rust_log,
            app_env,
            secrets_key,
        })
    }

    /// The socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_secrets_key(hex_str: &str) -> Result<Vec<u8>, ConfigError> {
    let bytes = hex::decode(hex_str).map_err(|e| ConfigError::Invalid {
        name: "SECRETS_ENCRYPTION_KEY",
        reason: format!("not valid hex: {e}"),
    })?;
    if bytes.len() != 32 {
        return Err(ConfigError::Invalid {
            name: "SECRETS_ENCRYPTION_KEY",
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_environment_parsing() {
        assert_eq!(
            AppEnvironment::from_env_str("production"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("PROD"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("dev"),
            AppEnvironment::Development
        );
        assert_eq!(
            AppEnvironment::from_env_str("staging"),
            AppEnvironment::Development
        );
    }

    #[test]
    fn test_secrets_key_parses_default() {
        let key = parse_secrets_key(INSECURE_SECRETS_KEY).unwrap();
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn test_secrets_key_rejects_bad_input() {
        assert!(parse_secrets_key("zz").is_err());
        assert!(parse_secrets_key("abcd").is_err());
    }
}

//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chef_market::db::DatabaseConfig;
use chrono::Duration;
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "127.0.0.1:3001";
const DEFAULT_TOKEN_TTL: &str = "1d";
/// Longest accepted session lifetime
const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration, `None` when running on the in-memory store
    pub database: Option<DatabaseConfig>,
    /// Security configuration
    pub security: SecurityConfig,
    /// Session cookie configuration
    pub cookie: CookieConfig,
    /// Browser origin allowed to make credentialed cross-origin requests
    pub cors_allowed_origin: Option<String>,
    /// Prometheus exporter bind address
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Session token lifetime
    pub token_ttl: Duration,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Session cookie attributes
#[derive(Debug, Clone, Default)]
pub struct CookieConfig {
    /// Only send the cookie over HTTPS
    pub secure: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory` - Use the in-memory store and ignore database settings
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_bind("SERVER_BIND", DEFAULT_BIND)?,
        };

        let database = if in_memory {
            None
        } else {
            let mut database = DatabaseConfig::from_env();
            if let Some(url) = database_url_override {
                database.database_url = url;
            }
            Some(database)
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let ttl_raw =
            std::env::var("TOKEN_TTL").unwrap_or_else(|_| DEFAULT_TOKEN_TTL.to_string());
        let token_ttl = parse_ttl(&ttl_raw).ok_or_else(|| ConfigError::Invalid {
            var: "TOKEN_TTL".to_string(),
            reason: format!("'{}' is not a duration like 3600, 15m, 12h or 7d", ttl_raw),
        })?;

        let cors_allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty());

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("'{}' is not a socket address", raw),
            })?),
            Err(_) => None,
        };

        let config = ServerConfig {
            bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                password_pepper,
                token_ttl,
            },
            cookie: CookieConfig {
                secure: parse_env_or("COOKIE_SECURE", false),
            },
            cors_allowed_origin,
            metrics_bind,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if self.security.token_ttl <= Duration::zero() {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.security.token_ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL".to_string(),
                reason: format!("Must not exceed {}d", MAX_TOKEN_TTL_DAYS),
            });
        }

        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        database.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a token lifetime.
///
/// Accepts plain seconds (`3600`) or a number with a unit suffix: `s`, `m`,
/// `h` or `d`.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };
    let value: i64 = digits.trim().parse().ok()?;

    match unit {
        's' => Duration::try_seconds(value),
        'm' => Duration::try_minutes(value),
        'h' => Duration::try_hours(value),
        'd' => Duration::try_days(value),
        _ => None,
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a socket address from the environment, rejecting malformed values
fn parse_bind(key: &str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("'{}' is not a socket address", raw),
    })
}

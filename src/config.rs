use chrono::{TimeDelta, Utc};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-me";

/// bcrypt accepts work factors in this range only.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    /// Rejects a token lifetime that is not positive or cannot be added to
    /// the current time, and a bcrypt cost outside 4..=31.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl_fits = self.token_ttl_secs > 0
            && TimeDelta::try_seconds(self.token_ttl_secs)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                .is_some();
        if !ttl_fits {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN_SECS",
                value: self.token_ttl_secs.to_string(),
            });
        }

        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    /// Only present for the MongoDB backend.
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Reads the server configuration from the process environment.
    /// Call `dotenv().ok()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match var_or("STORE_BACKEND", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => StoreBackend::MongoDB,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let database = match backend {
            StoreBackend::MongoDB => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("⚠️  JWT_SECRET not set, using the development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let auth = AuthConfig {
            jwt_secret,
            token_ttl_secs: parse_var("JWT_EXPIRES_IN_SECS", 3600)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };
        auth.validate()?;

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 3000)?,
            backend,
            database,
            auth,
            public_dir: PathBuf::from(var_or("PUBLIC_DIR", "public")),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let uri = env::var("MONGO_URI").map_err(|_| ConfigError::Missing("MONGO_URI"))?;
        Ok(Self {
            uri,
            name: var_or("MONGO_DB", "school"),
        })
    }
}

impl MailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let smtp_user = env::var("SMTP_USER").map_err(|_| ConfigError::Missing("SMTP_USER"))?;
        let smtp_password = env::var("SMTP_PASS").map_err(|_| ConfigError::Missing("SMTP_PASS"))?;
        let from = env::var("MAIL_FROM").unwrap_or_else(|_| smtp_user.clone());

        Ok(Self {
            smtp_host: var_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parse_var("SMTP_PORT", 465)?,
            smtp_user,
            smtp_password,
            from,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let port: u16 = parse_var("SCHOOL_SERVICE_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("SCHOOL_SERVICE_TEST_BAD_PORT", "eighty");
        let result: Result<u16, _> = parse_var("SCHOOL_SERVICE_TEST_BAD_PORT", 3000);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_auth_defaults() {
        let auth = AuthConfig::default();
        assert_eq!(auth.token_ttl_secs, 3600);
        assert_eq!(auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn test_token_ttl_out_of_range_rejected() {
        for ttl in [0, -5, i64::MAX, 9_000_000_000_000] {
            let auth = AuthConfig {
                token_ttl_secs: ttl,
                ..AuthConfig::default()
            };
            assert!(
                matches!(
                    auth.validate(),
                    Err(ConfigError::Invalid { name: "JWT_EXPIRES_IN_SECS", .. })
                ),
                "ttl {} accepted",
                ttl
            );
        }
    }

    #[test]
    fn test_bcrypt_cost_out_of_range_rejected() {
        for cost in [0, 3, 32, 100] {
            let auth = AuthConfig {
                bcrypt_cost: cost,
                ..AuthConfig::default()
            };
            assert!(matches!(
                auth.validate(),
                Err(ConfigError::Invalid { name: "BCRYPT_COST", .. })
            ));
        }

        let cheapest = AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        };
        assert!(cheapest.validate().is_ok());
    }
}

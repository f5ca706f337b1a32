//! Engine configuration loaded from the environment
//!
//! | Variable            | Default         |
//! |---------------------|-----------------|
//! | `JWT_KEY`           | required        |
//! | `JWT_TTL`           | `60`            |
//! | `JWT_HEADER_PREFIX` | `Bearer`        |
//! | `JWT_HEADER_NAME`   | `Authorization` |
//! | `JWT_MAX_TOKEN_LEN` | `8192`          |

use crate::engine::{DEFAULT_MAX_TOKEN_LEN, DEFAULT_TTL, TokenEngine};
use crate::error::JwtResult;
use crate::extractor::{DEFAULT_CARRIER, DEFAULT_PREFIX, TokenExtractor};
use std::env;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Secret variable name
pub const ENV_KEY: &str = "JWT_KEY";
/// TTL variable name
pub const ENV_TTL: &str = "JWT_TTL";
/// Carrier prefix variable name
pub const ENV_HEADER_PREFIX: &str = "JWT_HEADER_PREFIX";
/// Carrier name variable name
pub const ENV_HEADER_NAME: &str = "JWT_HEADER_NAME";
/// Token length bound variable name
pub const ENV_MAX_TOKEN_LEN: &str = "JWT_MAX_TOKEN_LEN";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid TTL value
    #[error("Invalid TTL: must be greater than 0")]
    InvalidTtl,

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Settings consumed by [`TokenEngine`] and [`TokenExtractor`]
#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: Zeroizing<String>,
    /// Default token lifetime in seconds
    pub default_ttl: i64,
    /// Carrier prefix, empty for a bare token
    pub carrier_prefix: String,
    /// Carrier name
    pub carrier_name: String,
    /// Upper bound on presented token length
    pub max_token_len: usize,
}

impl JwtConfig {
    /// Config with `secret` and defaults for everything else
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            default_ttl: DEFAULT_TTL,
            carrier_prefix: DEFAULT_PREFIX.to_string(),
            carrier_name: DEFAULT_CARRIER.to_string(),
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }

    /// Loads configuration from environment variables (and `.env`) with validation.
    ///
    /// # Errors
    /// Returns `ConfigError` when `JWT_KEY` is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    /// See [`JwtConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_KEY)
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired(ENV_KEY.to_string()))?;

        let config = Self {
            secret: Zeroizing::new(secret),
            default_ttl: parse_var(&lookup, ENV_TTL, DEFAULT_TTL)?,
            carrier_prefix: lookup(ENV_HEADER_PREFIX).unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            carrier_name: lookup(ENV_HEADER_NAME).unwrap_or_else(|| DEFAULT_CARRIER.to_string()),
            max_token_len: parse_var(&lookup, ENV_MAX_TOKEN_LEN, DEFAULT_MAX_TOKEN_LEN)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl <= 0 {
            return Err(ConfigError::InvalidTtl);
        }
        if self.carrier_name.is_empty() {
            return Err(ConfigError::MissingRequired(ENV_HEADER_NAME.to_string()));
        }
        Ok(())
    }

    /// Engine for this configuration with the default registry and policy
    ///
    /// # Errors
    /// Returns `MissingSecret` if the secret is empty
    pub fn engine(&self) -> JwtResult<TokenEngine> {
        TokenEngine::builder()
            .with_secret(self.secret.as_bytes())
            .with_default_ttl(self.default_ttl)
            .with_max_token_len(self.max_token_len)
            .build()
    }

    /// Extractor for this configuration
    #[must_use]
    pub fn extractor(&self) -> TokenExtractor {
        TokenExtractor::new(self.carrier_prefix.clone(), self.carrier_name.clone())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("default_ttl", &self.default_ttl)
            .field("carrier_prefix", &self.carrier_prefix)
            .field("carrier_name", &self.carrier_name)
            .field("max_token_len", &self.max_token_len)
            .finish()
    }
}

/// Parse a variable with a default value.
fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

//! Carrier-to-decision glue for the transport layer
//!
//! The transport (HTTP middleware, gRPC interceptor, ...) hands over the raw
//! carrier value and maps the returned [`Denial`] onto its own responses.
//! [`Denial`] prints the same text for every rejected token.

use crate::config::JwtConfig;
use crate::engine::{HookRejection, TokenEngine};
use crate::error::{Disposition, JwtError, JwtResult};
use crate::extractor::TokenExtractor;
use crate::header::Header;
use crate::payload::Payload;
use crate::token::VerifiedToken;
use std::fmt;

/// Failed authentication, carrying the underlying error for server-side use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    disposition: Disposition,
    error: JwtError,
}

impl Denial {
    /// How the transport should answer
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Denial for a failed issuance, always an internal error
    #[must_use]
    pub fn from_issue(error: JwtError) -> Self {
        Self {
            disposition: error.issue_disposition(),
            error,
        }
    }

    /// The underlying error. Do not send it to the client.
    #[must_use]
    pub fn error(&self) -> &JwtError {
        &self.error
    }
}

impl From<JwtError> for Denial {
    fn from(error: JwtError) -> Self {
        Self {
            disposition: error.disposition(),
            error,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.disposition {
            Disposition::AccessDenied => f.write_str("Access denied"),
            Disposition::InternalError => f.write_str("Internal server error"),
        }
    }
}

impl std::error::Error for Denial {}

/// Extractor and engine bundled for request authentication
#[derive(Debug, Clone)]
pub struct Authenticator {
    extractor: TokenExtractor,
    engine: TokenEngine,
}

impl Authenticator {
    /// Bundle `extractor` and `engine`
    #[must_use]
    pub fn new(extractor: TokenExtractor, engine: TokenEngine) -> Self {
        Self { extractor, engine }
    }

    /// Build both halves from `config`
    ///
    /// # Errors
    /// Returns `MissingSecret` if the configured secret is empty
    pub fn from_config(config: &JwtConfig) -> JwtResult<Self> {
        Ok(Self::new(config.extractor(), config.engine()?))
    }

    /// The extractor
    #[must_use]
    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    /// The engine
    #[must_use]
    pub fn engine(&self) -> &TokenEngine {
        &self.engine
    }

    /// Extract the token from `carrier` and verify it
    ///
    /// # Errors
    /// Returns a [`Denial`] for every extraction or verification failure
    pub fn authenticate(&self, carrier: Option<&str>) -> Result<VerifiedToken, Denial> {
        let token = self.extractor.extract(carrier)?;
        Ok(self.engine.verify(token)?)
    }

    /// [`Authenticator::authenticate`] with a validation hook
    ///
    /// # Errors
    /// See [`Authenticator::authenticate`]
    pub fn authenticate_with<F>(&self, carrier: Option<&str>, hook: F) -> Result<VerifiedToken, Denial>
    where
        F: Fn(&Header, &Payload) -> Result<(), HookRejection>,
    {
        let token = self.extractor.extract(carrier)?;
        Ok(self.engine.verify_with(token, hook)?)
    }
}

//! Pulls the raw token out of its carrier, e.g. `Authorization: Bearer <token>`

use crate::error::{JwtError, JwtResult};

/// Default carrier prefix
pub const DEFAULT_PREFIX: &str = "Bearer";

/// Default carrier name
pub const DEFAULT_CARRIER: &str = "Authorization";

/// Strips a configured prefix from a carrier value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExtractor {
    prefix: String,
    carrier_name: String,
}

impl TokenExtractor {
    /// Extractor for `prefix` (may be empty) in the carrier called `carrier_name`
    #[must_use]
    pub fn new(prefix: impl Into<String>, carrier_name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            carrier_name: carrier_name.into(),
        }
    }

    /// Configured prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the carrier field
    #[must_use]
    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    /// Return the raw token held by `carrier`.
    ///
    /// With an empty prefix the value is returned unchanged; otherwise exactly
    /// one leading `prefix + " "` is removed.
    ///
    /// # Errors
    /// Returns `CarrierMissing` when `carrier` is absent or empty and
    /// `PrefixMismatch` when the value does not start with the prefix
    pub fn extract<'a>(&self, carrier: Option<&'a str>) -> JwtResult<&'a str> {
        let value = carrier
            .filter(|value| !value.is_empty())
            .ok_or_else(|| JwtError::CarrierMissing(self.carrier_name.clone()))?;

        if self.prefix.is_empty() {
            return Ok(value);
        }

        value
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(|| JwtError::PrefixMismatch(self.prefix.clone()))
    }

    /// Look the carrier up by name, then [`TokenExtractor::extract`]
    ///
    /// # Errors
    /// See [`TokenExtractor::extract`]
    pub fn extract_from<'a, F>(&self, lookup: F) -> JwtResult<&'a str>
    where
        F: FnOnce(&str) -> Option<&'a str>,
    {
        self.extract(lookup(&self.carrier_name))
    }
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_CARRIER)
    }
}

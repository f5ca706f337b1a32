//! JOSE header

use crate::error::{JwtError, JwtResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_typ() -> String {
    "JWT".to_string()
}

/// Token header: algorithm alias, type, optional content type and extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    alg: String,
    #[serde(default = "default_typ")]
    typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

impl Header {
    /// Create a header for `alg` with `typ` set to `"JWT"`
    #[must_use]
    pub fn new(alg: &str) -> Self {
        Self {
            alg: alg.to_string(),
            typ: default_typ(),
            cty: None,
            extensions: Map::new(),
        }
    }

    /// Set the content type (`cty`), used for nested tokens
    #[must_use]
    pub fn with_content_type(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    /// Set the token type (`typ`)
    #[must_use]
    pub fn with_type(mut self, typ: impl Into<String>) -> Self {
        self.typ = typ.into();
        self
    }

    /// Add an extension field. Reserved names are ignored.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if !matches!(name.as_str(), "alg" | "typ" | "cty") {
            self.extensions.insert(name, value);
        }
        self
    }

    /// Decode a header segment. `alg` must be a non-empty string.
    ///
    /// # Errors
    /// Returns `MalformedInput` on any decoding failure or an empty `alg`
    pub fn decode(segment: &str) -> JwtResult<Self> {
        let header: Header = crate::codec::decode(segment)?;
        if header.alg.is_empty() {
            return Err(JwtError::malformed_input("field 'alg' is mandatory"));
        }
        Ok(header)
    }

    /// Encode this header as a segment
    ///
    /// # Errors
    /// Returns `Serialization` if an extension value cannot be serialized
    pub fn encode(&self) -> JwtResult<String> {
        crate::codec::encode(self)
    }

    /// Algorithm alias
    #[must_use]
    pub fn alg(&self) -> &str {
        &self.alg
    }

    /// Token type
    #[must_use]
    pub fn typ(&self) -> &str {
        &self.typ
    }

    /// Content type
    #[must_use]
    pub fn cty(&self) -> Option<&str> {
        self.cty.as_deref()
    }

    /// Extension field by name
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// All extension fields in insertion order
    #[must_use]
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(crate::algorithm::Algorithm::Hs256.alias())
    }
}

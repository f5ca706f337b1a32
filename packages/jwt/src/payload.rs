//! Token payload: reserved claims, extra claims and the activity window

use crate::error::{JwtError, JwtResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved claim names, in serialization order
pub const RESERVED_CLAIMS: [&str; 7] = ["iss", "sub", "aud", "exp", "nbf", "jti", "iat"];

/// Token payload.
///
/// Reserved claims are typed fields; every other claim is kept in an ordered
/// map and round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Payload {
    /// Empty payload with no claims
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload issued at `now`, expiring `ttl` seconds later, with a fresh `jti`
    #[must_use]
    pub fn for_issue(now: i64, ttl: i64) -> Self {
        Self {
            iat: Some(now),
            exp: Some(now.saturating_add(ttl)),
            jti: Some(uuid::Uuid::new_v4().simple().to_string()),
            ..Self::default()
        }
    }

    /// Decode a payload segment
    ///
    /// # Errors
    /// Returns `MalformedInput` on decoding failure or a mistyped reserved claim
    pub fn decode(segment: &str) -> JwtResult<Self> {
        crate::codec::decode(segment)
    }

    /// Encode this payload as a segment
    ///
    /// # Errors
    /// Returns `Serialization` if an extra claim cannot be serialized
    pub fn encode(&self) -> JwtResult<String> {
        crate::codec::encode(self)
    }

    /// Set the issuer
    #[must_use]
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the audience
    #[must_use]
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Set the expiry (Unix seconds)
    #[must_use]
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set the not-before time (Unix seconds)
    #[must_use]
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Set the token identifier
    #[must_use]
    pub fn with_jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Set the issued-at time (Unix seconds)
    #[must_use]
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Insert any claim.
    ///
    /// Reserved names land in their typed field and must carry the right JSON
    /// type; `null` clears them. Other names go to the extra claims.
    ///
    /// # Errors
    /// Returns `InvalidClaim` when a reserved claim has the wrong type
    pub fn insert_claim(&mut self, name: &str, value: Value) -> JwtResult<()> {
        match name {
            "iss" => self.iss = string_claim(name, value)?,
            "sub" => self.sub = string_claim(name, value)?,
            "aud" => self.aud = string_claim(name, value)?,
            "jti" => self.jti = string_claim(name, value)?,
            "exp" => self.exp = timestamp_claim(name, &value)?,
            "nbf" => self.nbf = timestamp_claim(name, &value)?,
            "iat" => self.iat = timestamp_claim(name, &value)?,
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Merge every entry of `claims`, in order, through [`Payload::insert_claim`]
    ///
    /// # Errors
    /// Returns `InvalidClaim` on the first mistyped reserved claim
    pub fn merge(&mut self, claims: Map<String, Value>) -> JwtResult<()> {
        for (name, value) in claims {
            self.insert_claim(&name, value)?;
        }
        Ok(())
    }

    /// Issuer
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// Subject
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Audience
    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        self.aud.as_deref()
    }

    /// Expiry
    #[must_use]
    pub fn expiry(&self) -> Option<i64> {
        self.exp
    }

    /// Not-before
    #[must_use]
    pub fn not_before(&self) -> Option<i64> {
        self.nbf
    }

    /// Token identifier
    #[must_use]
    pub fn jwt_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// Issued-at
    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        self.iat
    }

    /// Any claim by name, reserved or extra, as JSON
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<Value> {
        match name {
            "iss" => self.iss.clone().map(Value::from),
            "sub" => self.sub.clone().map(Value::from),
            "aud" => self.aud.clone().map(Value::from),
            "jti" => self.jti.clone().map(Value::from),
            "exp" => self.exp.map(Value::from),
            "nbf" => self.nbf.map(Value::from),
            "iat" => self.iat.map(Value::from),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// Extra (non-reserved) claims in insertion order
    #[must_use]
    pub fn extra_claims(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Whether the token is inside its validity window at `now`:
    /// not expired, already past `nbf`, and not issued in the future.
    #[must_use]
    pub fn is_active_at(&self, now: i64) -> bool {
        self.exp.is_none_or(|exp| now < exp)
            && self.nbf.is_none_or(|nbf| nbf <= now)
            && self.iat.is_none_or(|iat| iat <= now)
    }

    /// [`Payload::is_active_at`] against the wall clock
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now().timestamp())
    }
}

fn string_claim(name: &str, value: Value) -> JwtResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(JwtError::InvalidClaim(format!("'{name}' must be a string"))),
    }
}

fn timestamp_claim(name: &str, value: &Value) -> JwtResult<Option<i64>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_i64()
        .map(Some)
        .ok_or_else(|| JwtError::InvalidClaim(format!("'{name}' must be an integer timestamp")))
}

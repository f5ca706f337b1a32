//! Token error types and their boundary classification

use thiserror::Error;

/// Token operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// Errors produced while issuing, extracting or verifying tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Wrong segment count, an empty segment, or an oversized token
    #[error("Malformed token structure")]
    MalformedStructure,
    /// A segment is not valid base64url or not a JSON object of the expected shape
    #[error("Malformed token segment: {0}")]
    MalformedInput(String),
    /// Algorithm alias is absent from the registry
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Temporal window or claim policy rejected the payload
    #[error("Token is not active or not valid")]
    NotActiveOrInvalid,
    /// Caller-supplied validation hook rejected the token
    #[error("Custom validation failed: {0}")]
    CustomValidationFailed(String),
    /// Recomputed signature disagrees with the presented one
    #[error("Signature mismatch")]
    SignatureMismatch,
    /// Carrier field is absent or empty
    #[error("Token carrier '{0}' not found")]
    CarrierMissing(String),
    /// Carrier value does not start with the configured prefix
    #[error("Token prefix '{0}' not found")]
    PrefixMismatch(String),
    /// Engine was built without a signing secret
    #[error("Missing signing secret")]
    MissingSecret,
    /// Token lifetime is zero or negative
    #[error("Invalid TTL {0}: must be greater than 0")]
    InvalidTtl(i64),
    /// The secret could not key the MAC
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// An issuer-supplied claim has the wrong type for a reserved name
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),
    /// Claims could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse error taxonomy, one entry per failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`JwtError::MalformedStructure`]
    MalformedStructure,
    /// See [`JwtError::MalformedInput`]
    MalformedInput,
    /// See [`JwtError::UnsupportedAlgorithm`]
    UnsupportedAlgorithm,
    /// See [`JwtError::NotActiveOrInvalid`]
    NotActiveOrInvalid,
    /// See [`JwtError::CustomValidationFailed`]
    CustomValidationFailed,
    /// See [`JwtError::SignatureMismatch`]
    SignatureMismatch,
    /// See [`JwtError::CarrierMissing`]
    CarrierMissing,
    /// See [`JwtError::PrefixMismatch`]
    PrefixMismatch,
    /// Secret, TTL, key, claim or serialization defect on our side
    Configuration,
}

/// How the surrounding transport layer should answer a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Uniform denial; the caller learns nothing about which step failed
    AccessDenied,
    /// Programming or configuration defect
    InternalError,
}

impl JwtError {
    /// Create a malformed input error
    #[inline]
    #[must_use]
    pub fn malformed_input(msg: &str) -> Self {
        JwtError::MalformedInput(msg.to_string())
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: &str) -> Self {
        JwtError::UnsupportedAlgorithm(alg.to_string())
    }

    /// Create a custom validation error
    #[inline]
    #[must_use]
    pub fn custom_validation(reason: &str) -> Self {
        JwtError::CustomValidationFailed(reason.to_string())
    }

    /// Create an invalid claim error
    #[inline]
    #[must_use]
    pub fn invalid_claim(msg: &str) -> Self {
        JwtError::InvalidClaim(msg.to_string())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        JwtError::InvalidKey(msg.to_string())
    }

    /// Coarse kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JwtError::MalformedStructure => ErrorKind::MalformedStructure,
            JwtError::MalformedInput(_) => ErrorKind::MalformedInput,
            JwtError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            JwtError::NotActiveOrInvalid => ErrorKind::NotActiveOrInvalid,
            JwtError::CustomValidationFailed(_) => ErrorKind::CustomValidationFailed,
            JwtError::SignatureMismatch => ErrorKind::SignatureMismatch,
            JwtError::CarrierMissing(_) => ErrorKind::CarrierMissing,
            JwtError::PrefixMismatch(_) => ErrorKind::PrefixMismatch,
            JwtError::MissingSecret
            | JwtError::InvalidTtl(_)
            | JwtError::InvalidKey(_)
            | JwtError::InvalidClaim(_)
            | JwtError::Serialization(_) => ErrorKind::Configuration,
        }
    }

    /// Classification of a failure met while extracting or verifying a token.
    ///
    /// Failures returned by the `issue*` and `sign` operations are classified
    /// with [`JwtError::issue_disposition`] instead.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self.kind() {
            ErrorKind::Configuration => Disposition::InternalError,
            _ => Disposition::AccessDenied,
        }
    }

    /// Classification of a failure met while issuing a token.
    ///
    /// Always [`Disposition::InternalError`], `UnsupportedAlgorithm` included:
    /// the integrator chose the algorithm and the claims.
    #[inline]
    #[must_use]
    pub fn issue_disposition(&self) -> Disposition {
        Disposition::InternalError
    }
}

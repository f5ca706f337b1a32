//! Claim policies: the domain-specific "is this payload valid" predicate

use crate::payload::Payload;

/// Domain check applied to every decoded payload after the activity window.
///
/// A rejection is reported as `NotActiveOrInvalid`, the same outcome as an
/// expired token.
pub trait ClaimPolicy: Send + Sync + 'static {
    /// Whether `payload` is acceptable
    fn is_valid(&self, payload: &Payload) -> bool;
}

impl<F> ClaimPolicy for F
where
    F: Fn(&Payload) -> bool + Send + Sync + 'static,
{
    fn is_valid(&self, payload: &Payload) -> bool {
        self(payload)
    }
}

/// Policy that accepts every payload
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ClaimPolicy for AcceptAll {
    #[inline]
    fn is_valid(&self, _payload: &Payload) -> bool {
        true
    }
}

/// Requires `aud` to equal the configured audience
#[derive(Debug, Clone)]
pub struct RequireAudience(pub String);

impl ClaimPolicy for RequireAudience {
    fn is_valid(&self, payload: &Payload) -> bool {
        payload.audience() == Some(self.0.as_str())
    }
}

/// Requires `iss` to equal the configured issuer
#[derive(Debug, Clone)]
pub struct RequireIssuer(pub String);

impl ClaimPolicy for RequireIssuer {
    fn is_valid(&self, payload: &Payload) -> bool {
        payload.issuer() == Some(self.0.as_str())
    }
}

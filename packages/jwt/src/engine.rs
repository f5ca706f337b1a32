//! Token engine: issuance and the verification pipeline

use crate::algorithm::{Algorithm, AlgorithmRegistry};
use crate::error::{JwtError, JwtResult};
use crate::header::Header;
use crate::payload::Payload;
use crate::policy::{AcceptAll, ClaimPolicy};
use crate::signer::Signer;
use crate::token::{Token, TokenParts, VerifiedToken};
use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Default token lifetime in seconds
pub const DEFAULT_TTL: i64 = 60;

/// Default upper bound on the length of a presented token, in bytes
pub const DEFAULT_MAX_TOKEN_LEN: usize = 8 * 1024;

/// Reason given by a validation hook for rejecting a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookRejection(pub String);

impl HookRejection {
    /// Create a rejection with `reason`
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<&str> for HookRejection {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

impl From<String> for HookRejection {
    fn from(reason: String) -> Self {
        Self(reason)
    }
}

impl fmt::Display for HookRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-call check run after the activity window and before the signature
pub type ValidationHook<'a> = dyn Fn(&Header, &Payload) -> Result<(), HookRejection> + 'a;

/// Issues and verifies HMAC-signed compact tokens.
///
/// Holds only read-only state and can be shared between threads.
#[derive(Clone)]
pub struct TokenEngine {
    signer: Signer,
    default_ttl: i64,
    policy: Arc<dyn ClaimPolicy>,
    max_token_len: usize,
}

impl TokenEngine {
    /// Start building an engine
    #[must_use]
    pub fn builder() -> TokenEngineBuilder {
        TokenEngineBuilder::new()
    }

    /// Engine with the default registry (`HS256` only) and default TTL
    ///
    /// # Errors
    /// Returns `MissingSecret` when `secret` is empty
    pub fn new(secret: impl AsRef<[u8]>) -> JwtResult<Self> {
        Self::builder().with_secret(secret).build()
    }

    /// Lifetime used when [`TokenEngine::issue`] gets no TTL
    #[must_use]
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    /// Algorithms this engine accepts
    #[must_use]
    pub fn registry(&self) -> &AlgorithmRegistry {
        self.signer.registry()
    }

    /// Issue a new token.
    ///
    /// The payload carries `iat = now`, `exp = iat + ttl` and a fresh `jti`;
    /// `extra` is merged last and may override any of them.
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` when `alg` is not registered, `InvalidTtl`
    /// when the lifetime is not positive and `InvalidClaim` when `extra` holds a
    /// mistyped reserved claim
    pub fn issue(&self, ttl: Option<i64>, alg: &str, extra: Map<String, Value>) -> JwtResult<Token> {
        self.issue_at(ttl, alg, extra, Utc::now().timestamp())
    }

    /// [`TokenEngine::issue`] with the default TTL and `HS256`
    ///
    /// # Errors
    /// See [`TokenEngine::issue`]
    pub fn issue_default(&self, extra: Map<String, Value>) -> JwtResult<Token> {
        self.issue(None, Algorithm::Hs256.alias(), extra)
    }

    /// [`TokenEngine::issue`] with an explicit issue time
    ///
    /// # Errors
    /// See [`TokenEngine::issue`]
    pub fn issue_at(
        &self,
        ttl: Option<i64>,
        alg: &str,
        extra: Map<String, Value>,
        now: i64,
    ) -> JwtResult<Token> {
        self.signer.registry().resolve(alg)?;
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl <= 0 {
            return Err(JwtError::InvalidTtl(ttl));
        }

        let header = Header::new(alg);
        let mut payload = Payload::for_issue(now, ttl);
        payload.merge(extra)?;

        let token = self.sign(&header, &payload)?;
        tracing::debug!(
            alg,
            jti = ?payload.jwt_id(),
            exp = ?payload.expiry(),
            "issued token"
        );
        Ok(token)
    }

    /// Encode and sign caller-built claims with the algorithm named in `header`
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` when `header.alg()` is not registered
    pub fn sign(&self, header: &Header, payload: &Payload) -> JwtResult<Token> {
        let mut unsigned = header.encode()?;
        unsigned.push('.');
        unsigned.push_str(&payload.encode()?);

        let signature = self.signer.sign(&unsigned, header.alg())?;
        Ok(Token::from_parts(unsigned, &signature))
    }

    /// Verify `token` against the wall clock
    ///
    /// # Errors
    /// Returns the error of the first failing step; see [`TokenEngine::verify_with_at`]
    pub fn verify(&self, token: &str) -> JwtResult<VerifiedToken> {
        self.run(token, None, Utc::now().timestamp())
    }

    /// Verify `token` with a validation hook
    ///
    /// # Errors
    /// See [`TokenEngine::verify_with_at`]
    pub fn verify_with<F>(&self, token: &str, hook: F) -> JwtResult<VerifiedToken>
    where
        F: Fn(&Header, &Payload) -> Result<(), HookRejection>,
    {
        let hook: &ValidationHook<'_> = &hook;
        self.run(token, Some(hook), Utc::now().timestamp())
    }

    /// Verify `token` as of `now`
    ///
    /// # Errors
    /// See [`TokenEngine::verify_with_at`]
    pub fn verify_at(&self, token: &str, now: i64) -> JwtResult<VerifiedToken> {
        self.run(token, None, now)
    }

    /// Verify `token` as of `now` with a validation hook.
    ///
    /// Steps, each terminal on failure:
    /// 1. size bound and three non-empty segments (`MalformedStructure`)
    /// 2. header and payload decoding (`MalformedInput`)
    /// 3. activity window and claim policy (`NotActiveOrInvalid`)
    /// 4. the hook (`CustomValidationFailed`)
    /// 5. algorithm lookup and signature (`UnsupportedAlgorithm`, `SignatureMismatch`)
    ///
    /// # Errors
    /// Returns the error of the first failing step
    pub fn verify_with_at<F>(&self, token: &str, hook: F, now: i64) -> JwtResult<VerifiedToken>
    where
        F: Fn(&Header, &Payload) -> Result<(), HookRejection>,
    {
        let hook: &ValidationHook<'_> = &hook;
        self.run(token, Some(hook), now)
    }

    /// Verify and discard the claims
    ///
    /// # Errors
    /// See [`TokenEngine::verify`]
    pub fn authenticate(&self, token: &str) -> JwtResult<()> {
        self.verify(token).map(drop)
    }

    /// Verify with a validation hook and discard the claims
    ///
    /// # Errors
    /// See [`TokenEngine::verify_with`]
    pub fn authenticate_with<F>(&self, token: &str, hook: F) -> JwtResult<()>
    where
        F: Fn(&Header, &Payload) -> Result<(), HookRejection>,
    {
        self.verify_with(token, hook).map(drop)
    }

    fn run(
        &self,
        token: &str,
        hook: Option<&ValidationHook<'_>>,
        now: i64,
    ) -> JwtResult<VerifiedToken> {
        if token.len() > self.max_token_len {
            return Err(JwtError::MalformedStructure);
        }
        let parts = TokenParts::split(token)?;

        let header = Header::decode(parts.header)?;
        let payload = Payload::decode(parts.payload)?;

        if !(payload.is_active_at(now) && self.policy.is_valid(&payload)) {
            return Err(JwtError::NotActiveOrInvalid);
        }

        if let Some(hook) = hook {
            hook(&header, &payload).map_err(|rejection| JwtError::CustomValidationFailed(rejection.0))?;
        }

        self.signer
            .verify(parts.unsigned(), parts.signature, header.alg())?;

        tracing::trace!(alg = header.alg(), jti = ?payload.jwt_id(), "token accepted");
        Ok(VerifiedToken::new(header, payload))
    }
}

impl fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEngine")
            .field("signer", &self.signer)
            .field("default_ttl", &self.default_ttl)
            .field("max_token_len", &self.max_token_len)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TokenEngine`]
pub struct TokenEngineBuilder {
    secret: Option<Zeroizing<Vec<u8>>>,
    default_ttl: i64,
    registry: AlgorithmRegistry,
    policy: Arc<dyn ClaimPolicy>,
    max_token_len: usize,
}

impl TokenEngineBuilder {
    /// Builder with defaults: no secret, 60 s TTL, `HS256` only, accept-all policy
    #[must_use]
    pub fn new() -> Self {
        Self {
            secret: None,
            default_ttl: DEFAULT_TTL,
            registry: AlgorithmRegistry::default(),
            policy: Arc::new(AcceptAll),
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }

    /// Set the shared signing secret
    #[must_use]
    pub fn with_secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.secret = Some(Zeroizing::new(secret.as_ref().to_vec()));
        self
    }

    /// Set the TTL used when issuance gets none
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: i64) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Replace the algorithm registry
    #[must_use]
    pub fn with_registry(mut self, registry: AlgorithmRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the claim policy
    #[must_use]
    pub fn with_policy(mut self, policy: impl ClaimPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Bound the length of presented tokens
    #[must_use]
    pub fn with_max_token_len(mut self, max: usize) -> Self {
        self.max_token_len = max;
        self
    }

    /// Build the engine
    ///
    /// # Errors
    /// Returns `MissingSecret` when no secret, or an empty one, was given and
    /// `InvalidTtl` when the default TTL is not positive
    pub fn build(self) -> JwtResult<TokenEngine> {
        let secret = self
            .secret
            .filter(|secret| !secret.is_empty())
            .ok_or(JwtError::MissingSecret)?;
        if self.default_ttl <= 0 {
            return Err(JwtError::InvalidTtl(self.default_ttl));
        }

        Ok(TokenEngine {
            signer: Signer::new(secret.to_vec(), self.registry),
            default_ttl: self.default_ttl,
            policy: self.policy,
            max_token_len: self.max_token_len,
        })
    }
}

impl Default for TokenEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

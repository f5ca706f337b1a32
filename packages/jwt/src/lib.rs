//! HMAC-signed compact tokens (JWT, JWS compact serialization)
//!
//! This crate provides:
//! - issuance of `HS256` tokens with `iat`, `exp`, `jti` and caller claims
//! - a verification pipeline: structure, decoding, activity window, claim
//!   policy, caller hook, constant-time signature check
//! - a closed algorithm registry, so `"none"` and unregistered aliases never verify
//! - bearer-prefix extraction and environment configuration
//!
//! ```
//! use bearer_jwt::{TokenEngine, TokenExtractor};
//! use serde_json::{Map, json};
//!
//! let engine = TokenEngine::new("change-me")?;
//! let mut claims = Map::new();
//! claims.insert("sub".into(), json!("user-42"));
//! let token = engine.issue(Some(300), "HS256", claims)?;
//!
//! let carrier = format!("Bearer {token}");
//! let raw = TokenExtractor::default().extract(Some(carrier.as_str()))?;
//! let verified = engine.verify(raw)?;
//! assert_eq!(verified.payload().subject(), Some("user-42"));
//! # Ok::<(), bearer_jwt::JwtError>(())
//! ```

pub mod algorithm;
pub mod auth;
pub mod codec;
pub mod config;
pub mod engine;
mod error;
pub mod extractor;
pub mod header;
pub mod payload;
pub mod policy;
pub mod signer;
pub mod token;

pub use algorithm::{Algorithm, AlgorithmRegistry};
pub use auth::{Authenticator, Denial};
pub use config::{ConfigError, JwtConfig};
pub use engine::{HookRejection, TokenEngine, TokenEngineBuilder, ValidationHook};
pub use error::*;
pub use extractor::TokenExtractor;
pub use header::Header;
pub use payload::Payload;
pub use policy::{AcceptAll, ClaimPolicy, RequireAudience, RequireIssuer};
pub use signer::Signer;
pub use token::{Token, TokenParts, VerifiedToken};

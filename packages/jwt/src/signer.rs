//! Signing and signature verification over the unsigned token

use crate::algorithm::AlgorithmRegistry;
use crate::codec;
use crate::error::{JwtError, JwtResult};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Holds the shared secret and the algorithm registry.
///
/// The secret is wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct Signer {
    secret: Zeroizing<Vec<u8>>,
    registry: AlgorithmRegistry,
}

impl Signer {
    /// Create a signer for `secret` restricted to `registry`
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, registry: AlgorithmRegistry) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            registry,
        }
    }

    /// The algorithm registry
    #[must_use]
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Raw MAC of `data` with the algorithm registered under `alias`
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` for an unregistered alias
    pub fn hash(&self, data: &[u8], alias: &str) -> JwtResult<Vec<u8>> {
        let algorithm = self.registry.resolve(alias)?;
        algorithm.mac(data, &self.secret)
    }

    /// Base64url signature of `unsigned_token`
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` for an unregistered alias
    pub fn sign(&self, unsigned_token: &str, alias: &str) -> JwtResult<String> {
        let mac = Zeroizing::new(self.hash(unsigned_token.as_bytes(), alias)?);
        Ok(codec::encode_bytes(&mac))
    }

    /// Check `signature` (base64url) against a MAC recomputed over `unsigned_token`.
    ///
    /// The comparison runs in constant time over the expected MAC length.
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` for an unregistered alias and
    /// `SignatureMismatch` when the signature does not decode or does not match
    pub fn verify(&self, unsigned_token: &str, signature: &str, alias: &str) -> JwtResult<()> {
        let expected = Zeroizing::new(self.hash(unsigned_token.as_bytes(), alias)?);
        let presented = codec::decode_bytes(signature).map_err(|_| JwtError::SignatureMismatch)?;

        if bool::from(expected.as_slice().ct_eq(presented.as_slice())) {
            Ok(())
        } else {
            Err(JwtError::SignatureMismatch)
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"<redacted>")
            .field("registry", &self.registry)
            .finish()
    }
}

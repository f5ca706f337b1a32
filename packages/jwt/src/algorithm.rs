//! HMAC algorithms and the closed alias registry

use crate::error::{JwtError, JwtResult};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Every MAC primitive this crate can sign with.
///
/// The set is closed: a registry can only enable a subset of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// HMAC-SHA256
    Hs256,
    /// HMAC-SHA384
    Hs384,
    /// HMAC-SHA512
    Hs512,
}

impl Algorithm {
    /// All known algorithms
    pub const ALL: [Algorithm; 3] = [Algorithm::Hs256, Algorithm::Hs384, Algorithm::Hs512];

    /// Header alias (`alg` value)
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
        }
    }

    /// MAC output length in bytes
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Algorithm::Hs256 => 32,
            Algorithm::Hs384 => 48,
            Algorithm::Hs512 => 64,
        }
    }

    /// Compute the MAC of `data` under `secret`
    ///
    /// # Errors
    /// Returns `InvalidKey` if the MAC rejects the key
    pub fn mac(self, data: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
        match self {
            Algorithm::Hs256 => mac_with::<HmacSha256>(data, secret),
            Algorithm::Hs384 => mac_with::<HmacSha384>(data, secret),
            Algorithm::Hs512 => mac_with::<HmacSha512>(data, secret),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

fn mac_with<M: Mac + hmac::digest::KeyInit>(data: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| JwtError::invalid_key("Invalid HMAC key"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Immutable mapping from header alias to algorithm.
///
/// Built once when an engine is constructed. Lookups are exact and
/// case-sensitive, so `"none"`, `"hs256"` or a disabled alias never resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmRegistry {
    entries: BTreeMap<&'static str, Algorithm>,
}

impl AlgorithmRegistry {
    /// Registry enabling exactly `algorithms`
    #[must_use]
    pub fn new(algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        Self {
            entries: algorithms.into_iter().map(|alg| (alg.alias(), alg)).collect(),
        }
    }

    /// Registry enabling every HMAC variant
    #[must_use]
    pub fn all() -> Self {
        Self::new(Algorithm::ALL)
    }

    /// Resolve a header alias
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` when `alias` is not registered
    pub fn resolve(&self, alias: &str) -> JwtResult<Algorithm> {
        self.entries
            .get(alias)
            .copied()
            .ok_or_else(|| JwtError::unsupported_algorithm(alias))
    }

    /// Whether `alias` is registered
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Registered aliases in sorted order
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl Default for AlgorithmRegistry {
    /// Only `HS256`
    fn default() -> Self {
        Self::new([Algorithm::Hs256])
    }
}

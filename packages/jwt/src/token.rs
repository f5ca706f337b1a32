//! Compact token value and its structural split

use crate::error::{JwtError, JwtResult};
use crate::header::Header;
use crate::payload::Payload;
use std::fmt;

/// Signed compact token string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Borrow the compact string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the compact string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    pub(crate) fn from_parts(unsigned: String, signature: &str) -> Self {
        let mut raw = unsigned;
        raw.push('.');
        raw.push_str(signature);
        Self(raw)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three segments of a presented token, borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    /// Header segment
    pub header: &'a str,
    /// Payload segment
    pub payload: &'a str,
    /// Signature segment
    pub signature: &'a str,
    unsigned: &'a str,
}

impl<'a> TokenParts<'a> {
    /// Split `raw` into exactly three non-empty dot-separated segments
    ///
    /// # Errors
    /// Returns `MalformedStructure` for any other shape
    pub fn split(raw: &'a str) -> JwtResult<Self> {
        let (unsigned, signature) = raw.rsplit_once('.').ok_or(JwtError::MalformedStructure)?;
        let (header, payload) = unsigned.split_once('.').ok_or(JwtError::MalformedStructure)?;

        if header.is_empty() || payload.is_empty() || signature.is_empty() || payload.contains('.') {
            return Err(JwtError::MalformedStructure);
        }

        Ok(Self {
            header,
            payload,
            signature,
            unsigned,
        })
    }

    /// `header "." payload`, the exact bytes the signature covers
    #[must_use]
    pub fn unsigned(&self) -> &'a str {
        self.unsigned
    }
}

/// A token that passed every verification step
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    header: Header,
    payload: Payload,
}

impl VerifiedToken {
    pub(crate) fn new(header: Header, payload: Payload) -> Self {
        Self { header, payload }
    }

    /// Decoded header
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decoded payload
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Take the header and payload
    #[must_use]
    pub fn into_parts(self) -> (Header, Payload) {
        (self.header, self.payload)
    }
}

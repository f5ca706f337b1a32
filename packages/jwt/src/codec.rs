//! Segment codec: canonical JSON wrapped in unpadded base64url (RFC 7515)

use crate::error::{JwtError, JwtResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Base64 URL-safe encoding without padding
#[inline]
#[must_use]
pub fn encode_bytes(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding
///
/// # Errors
/// Returns `MalformedInput` when `input` is not canonical unpadded base64url
#[inline]
pub fn decode_bytes(input: &str) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| JwtError::MalformedInput(format!("base64url: {e}")))
}

/// Serialize `value` as compact JSON and encode it as a segment
///
/// # Errors
/// Returns `Serialization` if `value` cannot be represented as JSON
pub fn encode<T: Serialize>(value: &T) -> JwtResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| JwtError::Serialization(e.to_string()))?;
    Ok(encode_bytes(&json))
}

/// Top-level JSON object whose keys must be unique
struct UniqueObject(Map<String, Value>);

impl<'de> Deserialize<'de> for UniqueObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = UniqueObject;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<UniqueObject, A::Error> {
                let mut map = Map::new();
                while let Some(key) = access.next_key::<String>()? {
                    if map.contains_key(&key) {
                        return Err(de::Error::custom(format_args!("duplicate key '{key}'")));
                    }
                    let value: Value = access.next_value()?;
                    map.insert(key, value);
                }
                Ok(UniqueObject(map))
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}

/// Decode a segment into a JSON object.
///
/// Top-level keys must be unique; nested objects follow serde_json (last wins).
///
/// # Errors
/// Returns `MalformedInput` for bad base64url, bad JSON, JSON that is not an
/// object, or a repeated top-level key
pub fn decode_object(segment: &str) -> JwtResult<Map<String, Value>> {
    let bytes = decode_bytes(segment)?;
    serde_json::from_slice::<UniqueObject>(&bytes)
        .map(|object| object.0)
        .map_err(|e| JwtError::MalformedInput(format!("json: {e}")))
}

/// Decode a segment into `T`, keeping unknown keys wherever `T` flattens them
///
/// # Errors
/// Returns `MalformedInput` when decoding fails or a field has the wrong type
pub fn decode<T: DeserializeOwned>(segment: &str) -> JwtResult<T> {
    let map = decode_object(segment)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| JwtError::MalformedInput(e.to_string()))
}

//! Payload serialization formats.
//!
//! A store persists decoded payloads, not just response bodies, so it needs a
//! way to turn an arbitrary `Serialize` value into bytes and back. [`Format`]
//! is object safe (through `erased-serde`) so a store can hold it as
//! `&dyn Format` while [`CacheStore`](crate::CacheStore) stays generic over
//! the payload type.

use courier_core::Raw;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to encode or decode a stored payload.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The payload could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// The stored bytes could not be decoded into the requested type.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Object-safe payload format.
pub trait Format: Send + Sync {
    /// Encodes `value`.
    fn serialize_erased(&self, value: &dyn erased_serde::Serialize) -> Result<Raw, FormatError>;

    /// Builds a deserializer over `data` and hands it to `f`.
    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn for<'de> FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Typed helpers on top of any [`Format`], including `dyn Format`.
pub trait FormatExt: Format {
    /// Encodes a typed value.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Raw, FormatError> {
        self.serialize_erased(value)
    }

    /// Decodes a typed value.
    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, FormatError> {
        let mut decoded: Option<T> = None;
        self.with_deserializer(data, &mut |deserializer| {
            let value = erased_serde::deserialize::<T>(deserializer)
                .map_err(|e| FormatError::Deserialize(Box::new(e)))?;
            decoded = Some(value);
            Ok(())
        })?;
        decoded.ok_or_else(|| {
            FormatError::Deserialize(Box::new(std::io::Error::other(
                "deserialization produced no result",
            )))
        })
    }
}

impl<F: Format + ?Sized> FormatExt for F {}

/// JSON format (default).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn serialize_erased(&self, value: &dyn erased_serde::Serialize) -> Result<Raw, FormatError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut buf);
        erased_serde::serialize(value, &mut ser).map_err(|e| FormatError::Serialize(Box::new(e)))?;
        Ok(Raw::from(buf))
    }

    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn for<'de> FnMut(&mut dyn erased_serde::Deserializer<'de>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError> {
        let mut deser = serde_json::Deserializer::from_slice(data);
        let mut erased = <dyn erased_serde::Deserializer>::erase(&mut deser);
        f(&mut erased)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Post {
        id: u64,
        title: String,
    }

    #[test]
    fn json_through_dyn_format() {
        let format: &dyn Format = &JsonFormat;
        let post = Post {
            id: 7,
            title: "hello".into(),
        };
        let bytes = format.serialize(&post).unwrap();
        let back: Post = format.deserialize(&bytes).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn type_mismatch_is_a_deserialize_error() {
        let err = JsonFormat.deserialize::<Post>(br#"{"id":"seven"}"#).unwrap_err();
        assert!(matches!(err, FormatError::Deserialize(_)));
    }
}

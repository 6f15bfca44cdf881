//! Encoder Module
//!
//! Value-encoding strategies plugged into the store.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

// == Encoder ==
/// Converts values to the representation kept in the table and back.
///
/// `encode` returning `Ok(None)` is the "no value" marker: the store treats it
/// as a request to keep nothing under the key. This is independent of whether
/// the value is empty or zero; only the encoder decides what counts as absent.
pub trait Encoder<V> {
    /// Stored representation of a value.
    type Encoded;

    /// Encodes a value, or returns `None` when nothing should be stored.
    fn encode(&self, value: &V) -> Result<Option<Self::Encoded>>;

    /// Rebuilds a value from its stored representation.
    fn decode(&self, encoded: &Self::Encoded) -> Result<V>;

    /// Byte length of an encoded value, if the representation has one.
    fn byte_len(&self, encoded: &Self::Encoded) -> Option<usize>;

    /// Encodes an arbitrary placeholder, or `None` if the encoder cannot make one.
    ///
    /// Size-limited stores call this once at construction to check that the
    /// output reports a byte length.
    fn probe(&self) -> Option<Self::Encoded>;
}

// == Clone Encoder ==
/// Stores a private copy of each value and hands out copies on read.
///
/// Has no notion of byte length, so it cannot back a size-limited store.
#[derive(Debug)]
pub struct CloneEncoder<V>(PhantomData<fn() -> V>);

impl<V> CloneEncoder<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for CloneEncoder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for CloneEncoder<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<V: Clone> Encoder<V> for CloneEncoder<V> {
    type Encoded = V;

    fn encode(&self, value: &V) -> Result<Option<V>> {
        Ok(Some(value.clone()))
    }

    fn decode(&self, encoded: &V) -> Result<V> {
        Ok(encoded.clone())
    }

    fn byte_len(&self, _encoded: &V) -> Option<usize> {
        None
    }

    fn probe(&self) -> Option<V> {
        None
    }
}

// == Utf8 Encoder ==
/// Stores `String` values as raw UTF-8 bytes.
///
/// Never produces the "no value" marker: empty strings are stored like any other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoder;

impl Encoder<String> for Utf8Encoder {
    type Encoded = Bytes;

    fn encode(&self, value: &String) -> Result<Option<Bytes>> {
        Ok(Some(Bytes::copy_from_slice(value.as_bytes())))
    }

    fn decode(&self, encoded: &Bytes) -> Result<String> {
        // Only bytes produced by `encode` reach here, so they are valid UTF-8.
        Ok(String::from_utf8_lossy(encoded).into_owned())
    }

    fn byte_len(&self, encoded: &Bytes) -> Option<usize> {
        Some(encoded.len())
    }

    fn probe(&self) -> Option<Bytes> {
        Some(Bytes::new())
    }
}

// == Json Encoder ==
/// Serializes values to JSON bytes with serde_json.
///
/// Values serializing to JSON `null` (`None`, `()`, `Value::Null`) encode to
/// the "no value" marker.
#[derive(Debug)]
pub struct JsonEncoder<V>(PhantomData<fn() -> V>);

impl<V> JsonEncoder<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for JsonEncoder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for JsonEncoder<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

const JSON_NULL: &[u8] = b"null";

impl<V: Serialize + DeserializeOwned> Encoder<V> for JsonEncoder<V> {
    type Encoded = Bytes;

    fn encode(&self, value: &V) -> Result<Option<Bytes>> {
        let raw = serde_json::to_vec(value)?;
        if raw == JSON_NULL {
            return Ok(None);
        }
        Ok(Some(Bytes::from(raw)))
    }

    fn decode(&self, encoded: &Bytes) -> Result<V> {
        Ok(serde_json::from_slice(encoded)?)
    }

    fn byte_len(&self, encoded: &Bytes) -> Option<usize> {
        Some(encoded.len())
    }

    fn probe(&self) -> Option<Bytes> {
        Some(Bytes::from_static(b"\"\""))
    }
}

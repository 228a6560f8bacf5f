//! Serde values encoded with bincode

use std::io::{Read, Write};
use std::marker::PhantomData;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ValueCodec;
use crate::error::CodecError;

/// Largest encoded value accepted by [`BincodeCodec::new`] (64 MiB)
pub const DEFAULT_BINCODE_LIMIT: u64 = 64 * 1024 * 1024;

/// Codec for any serde-compatible value type.
///
/// Uses bincode's fixed-width, little-endian encoding, which is
/// self-delimiting, so decoding stops exactly at the end of the value.
///
/// Every value is bounded by a byte limit. A length prefix that declares more
/// than the limit fails with [`CodecError::Invalid`] before anything is
/// allocated; values larger than the limit cannot be encoded.
pub struct BincodeCodec<T> {
    limit: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeCodec<T> {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_BINCODE_LIMIT)
    }

    /// Codec accepting encoded values of at most `limit` bytes
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            _marker: PhantomData,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(self.limit)
    }
}

impl<T> Default for BincodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeCodec<T> {
    fn clone(&self) -> Self {
        Self::with_limit(self.limit)
    }
}

impl<T> std::fmt::Debug for BincodeCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BincodeCodec")
            .field("limit", &self.limit)
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> ValueCodec<T> for BincodeCodec<T> {
    fn encode(&self, value: &T, writer: &mut dyn Write) -> Result<(), CodecError> {
        self.options()
            .serialize_into(writer, value)
            .map_err(|e| match *e {
                bincode::ErrorKind::Io(io) => CodecError::Io(io),
                other => CodecError::Unrepresentable(other.to_string()),
            })
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<T, CodecError> {
        self.options()
            .deserialize_from(reader)
            .map_err(|e| match *e {
                bincode::ErrorKind::Io(io) => CodecError::Io(io),
                other => CodecError::Invalid(other.to_string()),
            })
    }
}

//! Codec Module
//!
//! The value codec contract: how opaque values reach and leave a stream.
//!
//! The tree and the persistence layer never look inside value bytes. A codec
//! is passed to each `save`/`load` call, so different calls may use
//! different codecs for the same value type.
//!
//! ## Provided Codecs
//! - [`BytesCodec`]: raw byte values, length-prefixed
//! - [`BincodeCodec`]: any serde type, via bincode
//! - [`FnCodec`]: a pair of closures
//!
//! [`write_bytes`] and [`read_bytes`] expose the `u64` BE length-prefixed
//! framing used for keys, for codecs assembled by hand.

mod bincode_codec;
mod bytes_codec;

use std::io::{ErrorKind, Read, Write};

use crate::error::CodecError;

pub use self::bincode_codec::{BincodeCodec, DEFAULT_BINCODE_LIMIT};
pub use self::bytes_codec::BytesCodec;

/// Encode/decode pair for tree values
pub trait ValueCodec<V> {
    /// Write `value` to `writer`
    fn encode(&self, value: &V, writer: &mut dyn Write) -> Result<(), CodecError>;

    /// Read one value from `reader`.
    ///
    /// Must consume exactly the bytes `encode` produced and never read ahead:
    /// the next item's key follows immediately on the stream.
    fn decode(&self, reader: &mut dyn Read) -> Result<V, CodecError>;
}

/// Codec built from an encode closure and a decode closure
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D> {
    pub fn new<V>(encode: E, decode: D) -> Self
    where
        E: Fn(&V, &mut dyn Write) -> Result<(), CodecError>,
        D: Fn(&mut dyn Read) -> Result<V, CodecError>,
    {
        Self { encode, decode }
    }
}

impl<V, E, D> ValueCodec<V> for FnCodec<E, D>
where
    E: Fn(&V, &mut dyn Write) -> Result<(), CodecError>,
    D: Fn(&mut dyn Read) -> Result<V, CodecError>,
{
    fn encode(&self, value: &V, writer: &mut dyn Write) -> Result<(), CodecError> {
        (self.encode)(value, writer)
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<V, CodecError> {
        (self.decode)(reader)
    }
}

// =============================================================================
// Length-prefixed framing
// =============================================================================

/// Write `data` as `len: u64 BE` followed by the bytes
pub fn write_bytes(writer: &mut dyn Write, data: &[u8]) -> Result<(), CodecError> {
    writer.write_all(&(data.len() as u64).to_be_bytes())?;
    writer.write_all(data)?;
    Ok(())
}

/// Read one [`write_bytes`] frame.
///
/// The declared length is never trusted for allocation: a frame cut short
/// fails with an `UnexpectedEof` I/O error.
pub fn read_bytes(reader: &mut dyn Read) -> Result<Vec<u8>, CodecError> {
    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes)?;
    let len = u64::from_be_bytes(len_bytes);

    let mut data = Vec::new();
    reader.take(len).read_to_end(&mut data)?;
    if data.len() as u64 != len {
        return Err(CodecError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("frame truncated: expected {} bytes, got {}", len, data.len()),
        )));
    }
    Ok(data)
}

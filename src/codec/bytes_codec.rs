//! Length-prefixed raw byte values
//!
//! ```text
//! ┌──────────────┬─────────────────────┐
//! │ Len: u64 BE  │  Value bytes [Len]  │
//! └──────────────┴─────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::Bytes;

use super::{read_bytes, write_bytes, ValueCodec};
use crate::error::CodecError;

/// Codec for `Bytes` values
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl ValueCodec<Bytes> for BytesCodec {
    fn encode(&self, value: &Bytes, writer: &mut dyn Write) -> Result<(), CodecError> {
        write_bytes(writer, value)
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<Bytes, CodecError> {
        read_bytes(reader).map(Bytes::from)
    }
}

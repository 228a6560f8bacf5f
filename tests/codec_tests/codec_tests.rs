//! Codec Tests
//!
//! Tests for the provided value codecs: wire layout, exact consumption and
//! error reporting on malformed input.

use std::io::{Cursor, ErrorKind, Read, Write};

use atlastree::{read_bytes, write_bytes, BincodeCodec, BytesCodec, CodecError, FnCodec, ValueCodec};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

// =============================================================================
// BytesCodec Tests
// =============================================================================

#[test]
fn test_bytes_codec_layout() {
    let mut out = Vec::new();
    BytesCodec
        .encode(&Bytes::from_static(b"hello"), &mut out)
        .unwrap();

    let mut expected = 5u64.to_be_bytes().to_vec();
    expected.extend_from_slice(b"hello");
    assert_eq!(out, expected);
}

#[test]
fn test_bytes_codec_empty_and_binary_values() {
    let values = [Bytes::new(), Bytes::from((0..=255u8).collect::<Vec<u8>>())];

    let mut out = Vec::new();
    for value in &values {
        BytesCodec.encode(value, &mut out).unwrap();
    }

    let mut cursor = Cursor::new(out);
    for value in &values {
        assert_eq!(&BytesCodec.decode(&mut cursor).unwrap(), value);
    }
}

#[test]
fn test_bytes_codec_consumes_exactly_one_value() {
    let mut out = Vec::new();
    BytesCodec
        .encode(&Bytes::from_static(b"first"), &mut out)
        .unwrap();
    out.extend_from_slice(b"TRAILER");

    let mut cursor = Cursor::new(out);
    let value = BytesCodec.decode(&mut cursor).unwrap();

    assert_eq!(value, Bytes::from_static(b"first"));
    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"TRAILER");
}

#[test]
fn test_bytes_codec_truncated_value() {
    let mut out = Vec::new();
    BytesCodec
        .encode(&Bytes::from_static(b"truncated"), &mut out)
        .unwrap();
    out.truncate(out.len() - 3);

    let err = BytesCodec.decode(&mut out.as_slice()).unwrap_err();
    match err {
        CodecError::Io(e) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_bytes_codec_huge_declared_length() {
    // Declared length far beyond the data must not allocate it up front
    let mut out = u64::MAX.to_be_bytes().to_vec();
    out.extend_from_slice(b"abc");

    let err = BytesCodec.decode(&mut out.as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Io(ref e) if e.kind() == ErrorKind::UnexpectedEof));
}

#[test]
fn test_bytes_frames_compose_into_records() {
    // (name, slot) records built from the shared framing helpers
    let codec = FnCodec::new(
        |value: &(String, u64), writer: &mut dyn Write| {
            write_bytes(writer, value.0.as_bytes())?;
            writer.write_all(&value.1.to_be_bytes())?;
            Ok(())
        },
        |reader: &mut dyn Read| {
            let name = String::from_utf8(read_bytes(reader)?)
                .map_err(|e| CodecError::Invalid(e.to_string()))?;
            let mut slot = [0u8; 8];
            reader.read_exact(&mut slot)?;
            Ok((name, u64::from_be_bytes(slot)))
        },
    );

    let mut out = Vec::new();
    codec.encode(&("alpha".to_string(), 7), &mut out).unwrap();
    codec.encode(&(String::new(), u64::MAX), &mut out).unwrap();

    let mut expected = 5u64.to_be_bytes().to_vec();
    expected.extend_from_slice(b"alpha");
    expected.extend_from_slice(&7u64.to_be_bytes());
    assert_eq!(&out[..expected.len()], expected.as_slice());

    let mut cursor = Cursor::new(out);
    assert_eq!(codec.decode(&mut cursor).unwrap(), ("alpha".to_string(), 7));
    assert_eq!(codec.decode(&mut cursor).unwrap(), (String::new(), u64::MAX));
}

#[test]
fn test_read_bytes_truncated_frame() {
    let mut out = Vec::new();
    write_bytes(&mut out, b"abcdef").unwrap();
    out.truncate(out.len() - 2);

    let err = read_bytes(&mut out.as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Io(ref e) if e.kind() == ErrorKind::UnexpectedEof));
}

// =============================================================================
// BincodeCodec Tests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    id: String,
    slot: u64,
    point: (f64, f64),
}

#[test]
fn test_bincode_codec_struct_values() {
    let codec = BincodeCodec::<Record>::new();
    let records: Vec<Record> = (0..10)
        .map(|i| Record {
            id: format!("key{}", i),
            slot: i,
            point: (i as f64 / 10.0, i as f64 / 10.0),
        })
        .collect();

    let mut out = Vec::new();
    for record in &records {
        codec.encode(record, &mut out).unwrap();
    }

    let mut cursor = Cursor::new(out);
    for record in &records {
        assert_eq!(&codec.decode(&mut cursor).unwrap(), record);
    }
    assert_eq!(cursor.position() as usize, cursor.get_ref().len());
}

#[test]
fn test_bincode_codec_truncated_input_is_io_error() {
    let codec = BincodeCodec::<Record>::new();
    let mut out = Vec::new();
    codec
        .encode(
            &Record {
                id: "abc".to_string(),
                slot: 1,
                point: (0.0, 1.0),
            },
            &mut out,
        )
        .unwrap();
    out.truncate(out.len() - 1);

    let err = codec.decode(&mut out.as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Io(_)), "got {:?}", err);
}

#[test]
fn test_bincode_codec_invalid_input() {
    // A bool must be encoded as 0 or 1
    let codec = BincodeCodec::<bool>::new();
    let err = codec.decode(&mut [7u8].as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)), "got {:?}", err);
}

#[test]
fn test_bincode_codec_huge_declared_length() {
    let codec = BincodeCodec::<String>::new();
    let mut out = Vec::new();
    codec.encode(&"v".to_string(), &mut out).unwrap();

    // String length prefix is a little-endian u64
    out[..8].copy_from_slice(&(1u64 << 40).to_le_bytes());

    let err = codec.decode(&mut out.as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)));
}

#[test]
fn test_bincode_codec_with_limit() {
    let small = BincodeCodec::<String>::with_limit(16);
    assert_eq!(small.limit(), 16);

    let long = "x".repeat(100);
    let err = small.encode(&long, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, CodecError::Unrepresentable(_)));

    let mut out = Vec::new();
    BincodeCodec::<String>::new().encode(&long, &mut out).unwrap();
    let err = small.decode(&mut out.as_slice()).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)));

    let short = "fits".to_string();
    let mut out = Vec::new();
    small.encode(&short, &mut out).unwrap();
    assert_eq!(small.decode(&mut out.as_slice()).unwrap(), short);
}

// =============================================================================
// FnCodec Tests
// =============================================================================

#[test]
fn test_fn_codec_round_trip() {
    let codec = FnCodec::new(
        |value: &u32, writer: &mut dyn Write| {
            writer.write_all(&value.to_be_bytes())?;
            Ok(())
        },
        |reader: &mut dyn Read| {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            Ok(u32::from_be_bytes(buf))
        },
    );

    let mut out = Vec::new();
    codec.encode(&0xDEADBEEF, &mut out).unwrap();
    assert_eq!(out, vec![0xDE, 0xAD, 0xBE, 0xEF]);

    assert_eq!(codec.decode(&mut out.as_slice()).unwrap(), 0xDEADBEEF);
}

#[test]
fn test_fn_codec_propagates_errors() {
    let codec = FnCodec::new(
        |value: &i64, _writer: &mut dyn Write| {
            if *value < 0 {
                return Err(CodecError::Unrepresentable(format!("negative: {}", value)));
            }
            Ok(())
        },
        |_reader: &mut dyn Read| Err::<i64, _>(CodecError::Invalid("always".to_string())),
    );

    let err = codec.encode(&-1, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, CodecError::Unrepresentable(_)));

    let err = codec.decode(&mut std::io::empty()).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)));
}

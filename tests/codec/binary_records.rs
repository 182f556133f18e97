//! Type-4 records inside a transaction.

use crate::common::init_tracing;
use nistcodec::{Codec, FieldValue, NistError, NistFile, FS, RS, US};

const PIXELS: [u8; 12] = [0x00, 0x10, 0x20, 0x30, 0x1C, 0x1D, 0x1E, 0x1F, 0xC0, 0xD0, 0xE0, 0xFF];

fn fingerprint_file(pixels: &[u8]) -> NistFile {
    let mut file = NistFile::new();
    file.add(2, 0, [(4, "20240101")]).unwrap();
    file.add(
        4,
        1,
        [
            (3, FieldValue::scalar("1")),
            (4, FieldValue::scalar("2")),
            (5, FieldValue::scalar("0")),
            (6, FieldValue::scalar("4")),
            (7, FieldValue::scalar("3")),
            (8, FieldValue::scalar("0")),
            (999, FieldValue::blob(pixels)),
        ],
    )
    .unwrap();
    file.add(9, 1, [(3, "0"), (4, "S")]).unwrap();
    file
}

/// Bytes of the Type-1 and Type-2 records ahead of the Type-4 record
fn tagged_prefix(file: &NistFile) -> usize {
    let codec = Codec::default();
    codec.record_length(file.header()).unwrap() + codec.record_length(file.get(2, 0).unwrap()).unwrap()
}

fn expected_type4() -> Vec<u8> {
    let mut bytes = vec![
        0x00, 0x00, 0x00, 0x1E, // length 30
        0x01, // IDC
        0x01, // impression
        0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // finger positions
        0x00, // scanning resolution
        0x00, 0x04, // width
        0x00, 0x03, // height
        0x00, // compression
    ];
    bytes.extend_from_slice(&PIXELS);
    bytes
}

#[test]
fn binary_record_sits_between_tagged_records() {
    init_tracing();
    let file = fingerprint_file(&PIXELS);
    let bytes = file.serialize().unwrap();

    let manifest = [b'1', US, b'3', RS, b'2', US, b'0', RS, b'4', US, b'1', RS, b'9', US, b'1'];
    assert!(bytes.windows(manifest.len()).any(|w| w == manifest));

    let tagged_prefix = tagged_prefix(&file);
    let type4 = expected_type4();
    assert_eq!(&bytes[tagged_prefix..tagged_prefix + type4.len()], type4.as_slice());
    assert!(bytes[tagged_prefix + type4.len()..].starts_with(b"9.001:"));
    assert_eq!(bytes.last(), Some(&FS));
}

#[test]
fn binary_record_roundtrip() {
    let file = fingerprint_file(&PIXELS);
    let parsed = NistFile::parse(&file.serialize().unwrap()).unwrap();
    let record = parsed.get(4, 1).unwrap();

    assert!(record.content_eq(file.get(4, 1).unwrap()));
    assert_eq!(record.declared_length(), Some(30));
    assert_eq!(record.text(4), Some("2"));
    assert_eq!(record.field(999).and_then(FieldValue::as_bytes), Some(&PIXELS[..]));
}

#[test]
fn several_finger_positions() {
    let mut file = fingerprint_file(&PIXELS);
    file.get_mut(4, 1)
        .unwrap()
        .set_field(4, FieldValue::structured([["2", "3", "7"]]))
        .unwrap();
    let parsed = NistFile::parse(&file.serialize().unwrap()).unwrap();
    assert_eq!(
        parsed.get(4, 1).unwrap().field(4),
        Some(&FieldValue::structured([["2", "3", "7"]]))
    );
}

#[test]
fn pixel_count_must_match_geometry() {
    let file = fingerprint_file(&PIXELS[..11]);
    let err = file.serialize().unwrap_err();
    assert!(matches!(err, NistError::LengthMismatch { declared: 12, actual: 11, .. }), "{:?}", err);
    assert_eq!(err.location().record_type, Some(4));
    assert_eq!(err.location().idc, Some(1));
}

#[test]
fn truncated_binary_record() {
    let file = fingerprint_file(&PIXELS);
    let bytes = file.serialize().unwrap();
    let cut = tagged_prefix(&file) + 20;
    let err = NistFile::parse(&bytes[..cut]).unwrap_err();
    assert!(matches!(err, NistError::TruncatedInput { .. }), "{:?}", err);
    assert_eq!(err.location().record_type, Some(4));
}

#[test]
fn binary_idc_must_fit_one_byte() {
    let mut file = NistFile::new();
    let err = file.add(4, 256, [(3, "1")]).unwrap_err();
    assert!(matches!(err, NistError::InvalidField { .. }));
}

//! Vendor profiles: registered field codecs take precedence over the
//! standard separator codec, and only for the fields they name.

use crate::common::*;
use base64::Engine;
use nist_fingerprint::{AnnotationLayout, ColumnFormat, ColumnType, LayoutTranscodeCodec};
use nistcodec::{
    CodecOptions, FieldValue, NistError, NistFile, OverrideRegistry, VendorProfile,
};

fn five_digit_minutiae() -> AnnotationLayout {
    AnnotationLayout::new(vec![
        vec![ColumnFormat::free('i', ColumnType::Int)],
        vec![
            ColumnFormat::fixed('x', 5, 100.0, ColumnType::Float),
            ColumnFormat::fixed('y', 5, 100.0, ColumnType::Float),
            ColumnFormat::fixed('t', 3, 1.0, ColumnType::Int),
        ],
        vec![ColumnFormat::free('q', ColumnType::Int)],
        vec![ColumnFormat::free('d', ColumnType::Text)],
    ])
    .unwrap()
}

fn acme_registry() -> OverrideRegistry {
    OverrideRegistry::with_builtin_profiles().with_profile(
        VendorProfile::new("acme")
            .with_override(9, 12, LayoutTranscodeCodec::minutiae(five_digit_minutiae())),
    )
}

#[test]
fn vendor_layout_only_touches_overridden_field() {
    init_tracing();
    let registry = acme_registry();
    let file = latent_file();

    let standard = nistcodec::serialize(&file, &test_options(), &registry).unwrap();
    let acme = nistcodec::serialize(&file, &test_options().with_vendor("acme"), &registry).unwrap();

    let standard_records = split_tagged_records(&standard);
    let acme_records = split_tagged_records(&acme);
    assert_eq!(standard_records.len(), acme_records.len());

    for (n, (s, a)) in standard_records.iter().zip(&acme_records).enumerate() {
        if n == 2 {
            continue;
        }
        assert_eq!(s, a, "record {} differs", n);
    }

    // Ten minutiae, two extra digits each
    let type9 = acme_records[2];
    assert_eq!(type9.len(), 266 + 20);
    assert!(type9.starts_with(b"9.001:00000286"));
    let first_row = b"9.012:1\x1f0078500705290\x1f0\x1fA\x1e";
    assert!(type9.windows(first_row.len()).any(|w| w == first_row));

    // Everything between the length field and 9.012 is unchanged
    let prefix_end = |r: &[u8]| r.windows(6).position(|w| w == b"9.012:").unwrap();
    assert_eq!(
        &standard_records[2][14..prefix_end(standard_records[2])],
        &type9[14..prefix_end(type9)]
    );
}

#[test]
fn vendor_layout_parses_back_to_standard_model() {
    let registry = acme_registry();
    let file = latent_file();
    let options = test_options().with_vendor("acme");

    let bytes = nistcodec::serialize(&file, &options, &registry).unwrap();
    let parsed = nistcodec::parse(&bytes, &options, &registry).unwrap();

    for (original, back) in file.records().zip(parsed.records()) {
        assert!(original.content_eq(back), "{} changed", original.key());
    }
    assert_eq!(parsed.get(9, 0).unwrap().declared_length(), Some(286));

    // Without the profile the vendor bytes do not fit the standard layout
    let standard = nistcodec::parse(&bytes, &test_options(), &registry).unwrap();
    let minutiae = standard.get(9, 0).unwrap().field(12).unwrap();
    assert_ne!(minutiae, file.get(9, 0).unwrap().field(12).unwrap());
    assert!(nist_fingerprint::minutiae(standard.get(9, 0).unwrap()).is_err());
}

fn jar_file(payload: &[u8]) -> NistFile {
    let mut file = NistFile::new();
    file.add(9, 1, [(3, FieldValue::scalar("4")), (184, FieldValue::blob(payload))])
        .unwrap();
    file
}

#[test]
fn morpho_field_is_base64_on_the_wire() {
    let payload = [b'P', b'K', 0x03, 0x04, nistcodec::FS, nistcodec::GS, 0x00, 0xFF];
    let file = jar_file(&payload);
    let registry = OverrideRegistry::builtin();
    let options = CodecOptions::new().with_vendor("morpho");

    let bytes = nistcodec::serialize(&file, &options, registry).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(payload);
    let tagged = [&b"9.184:"[..], encoded.as_bytes()].concat();
    assert!(bytes.windows(tagged.len()).any(|w| w == tagged.as_slice()));

    let parsed = nistcodec::parse(&bytes, &options, registry).unwrap();
    assert_eq!(
        parsed.get(9, 1).unwrap().field(184),
        Some(&FieldValue::blob(payload.to_vec()))
    );

    // Read with the standard layout the field is plain text
    let plain = nistcodec::parse(&bytes, &CodecOptions::new(), registry).unwrap();
    assert_eq!(plain.get(9, 1).unwrap().text(184), Some(encoded.as_str()));
}

#[test]
fn morpho_field_needs_the_profile_to_serialize() {
    let file = jar_file(b"PK\x03\x04");
    let err = file.serialize().unwrap_err();
    assert!(matches!(err, NistError::Encoding { .. }), "{:?}", err);
    assert_eq!(err.location().record_type, Some(9));
    assert_eq!(err.location().idc, Some(1));
    assert_eq!(err.location().field, Some(184));
}

#[test]
fn morpho_field_read_as_text_is_not_encoded_twice() {
    let registry = OverrideRegistry::builtin();
    let morpho = CodecOptions::new().with_vendor("morpho");
    let bytes = nistcodec::serialize(&jar_file(b"PK\x03\x04"), &morpho, registry).unwrap();

    let plain = nistcodec::parse(&bytes, &CodecOptions::new(), registry).unwrap();
    assert_eq!(plain.get(9, 1).unwrap().text(184), Some("UEsDBA=="));

    let err = nistcodec::serialize(&plain, &morpho, registry).unwrap_err();
    assert!(matches!(err, NistError::Encoding { .. }), "{:?}", err);
    assert_eq!(err.location().record_type, Some(9));
    assert_eq!(err.location().idc, Some(1));
    assert_eq!(err.location().field, Some(184));
}

#[test]
fn unknown_vendor_is_rejected_before_any_work() {
    let registry = OverrideRegistry::builtin();
    let options = CodecOptions::new().with_vendor("nobody");

    let err = nistcodec::serialize(&latent_file(), &options, registry).unwrap_err();
    assert!(matches!(err, NistError::UnsupportedVendorProfile { .. }));

    let err = nistcodec::parse(b"garbage", &options, registry).unwrap_err();
    assert!(matches!(err, NistError::UnsupportedVendorProfile { .. }));
}

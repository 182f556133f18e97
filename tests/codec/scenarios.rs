//! End-to-end scenarios on the latent reference transaction.

use crate::common::*;
use nist_fingerprint::{AnnotationKind, AnnotationList, FormatSpec};
use nistcodec::{NistError, NistFile, FS, GS, RS, US};

const MINUTIAE_WIRE: &str = "1\x1f07850705290\x1f0\x1fA\x1e\
2\x1f13801530155\x1f0\x1fA\x1e\
3\x1f11462232224\x1f0\x1fA\x1e\
4\x1f22612517194\x1f0\x1fA\x1e\
5\x1f06970848153\x1f0\x1fA\x1e\
6\x1f12581988346\x1f0\x1fA\x1e\
7\x1f19691980111\x1f0\x1fA\x1e\
8\x1f12310387147\x1f0\x1fA\x1e\
9\x1f13881429330\x1f0\x1fA\x1e\
10\x1f15472249271\x1f0\x1fA";

#[test]
fn latent_file_manifest_and_minutiae_length() {
    init_tracing();
    let bytes = latent_file().serialize().unwrap();
    let records = split_tagged_records(&bytes);
    assert_eq!(records.len(), 4);

    let header = records[0];
    let manifest = [
        &b"1.003:"[..],
        &[b'1', US, b'3', RS, b'2', US, b'0', RS, b'9', US, b'0', RS, b'1', b'3', US, b'0'],
    ]
    .concat();
    assert!(
        header.windows(manifest.len()).any(|w| w == manifest.as_slice()),
        "manifest not found in {:?}",
        String::from_utf8_lossy(header)
    );

    let type9 = records[2];
    assert!(type9.starts_with(b"9.001:00000266"));
    assert_eq!(type9.len(), 266);
    let mut expected = Vec::new();
    for (n, field) in [
        "9.001:00000266",
        "9.002:0",
        "9.003:4",
        "9.004:S",
        "9.006:0",
        "9.008:12501870",
        "9.010:10",
        "9.011:0",
    ]
    .iter()
    .enumerate()
    {
        if n > 0 {
            expected.push(GS);
        }
        expected.extend_from_slice(field.as_bytes());
    }
    expected.push(GS);
    expected.extend_from_slice(b"9.012:");
    expected.extend_from_slice(MINUTIAE_WIRE.as_bytes());
    expected.push(FS);
    assert_eq!(type9, expected.as_slice());

    let image = records[3];
    assert!(image.starts_with(b"13.001:"));
    assert!(image.ends_with(&[0xFF, 0xFF, FS]));
}

#[test]
fn latent_file_roundtrip() {
    let file = latent_file();
    let bytes = file.serialize().unwrap();
    let parsed = NistFile::parse(&bytes).unwrap();

    assert_eq!(parsed.keys().collect::<Vec<_>>(), file.keys().collect::<Vec<_>>());
    for (original, back) in file.records().zip(parsed.records()) {
        assert!(original.content_eq(back), "{} changed", original.key());
    }
    assert_eq!(parsed.get(9, 0).unwrap().declared_length(), Some(266));

    let minutiae = nist_fingerprint::minutiae(parsed.get_single(9).unwrap()).unwrap();
    let spec = FormatSpec::parse("ixytqd").unwrap();
    assert_eq!(
        minutiae.to_list(&spec).unwrap(),
        reference_minutiae().to_list(&spec).unwrap()
    );
    assert_eq!(parsed.serialize().unwrap(), bytes);
}

#[test]
fn truncation_mid_field_is_reported() {
    let bytes = latent_file().serialize().unwrap();
    let records = split_tagged_records(&bytes);
    // Cut inside 9.012 of the Type-9 record
    let cut = records[0].len() + records[1].len() + 200;
    let err = NistFile::parse(&bytes[..cut]).unwrap_err();
    assert!(matches!(err, NistError::TruncatedInput { .. }), "{:?}", err);
    assert_eq!(err.location().record_type, Some(9));
    assert_eq!(err.location().idc, Some(0));
}

#[test]
fn truncation_inside_image_is_reported() {
    let bytes = latent_file().serialize().unwrap();
    let err = NistFile::parse(&bytes[..bytes.len() - 1000]).unwrap_err();
    assert!(matches!(err, NistError::TruncatedInput { .. }));
    assert_eq!(err.location().record_type, Some(13));
}

#[test]
fn separator_in_designator_is_rejected() {
    let mut rows = minutiae_rows(&REFERENCE_MINUTIAE);
    rows[3][5] = "A\u{1f}B".into();
    let spec = FormatSpec::parse("ixytqd").unwrap();
    let list = AnnotationList::from_list(&rows, &spec, AnnotationKind::Minutia).unwrap();

    let mut file = latent_file();
    let before = file.get(9, 0).unwrap().clone();
    let record = file.get_mut(9, 0).unwrap();
    let err = nist_fingerprint::set_minutiae(record, &list).unwrap_err();
    assert!(matches!(err, NistError::Encoding { .. }));
    assert_eq!(err.location().field, Some(12));
    assert_eq!(file.get(9, 0).unwrap(), &before);
}

#[test]
fn separator_in_raw_field_is_rejected() {
    let mut file = latent_file();
    let record = file.get_mut(9, 0).unwrap();
    let err = record
        .set_field(
            12,
            nistcodec::FieldValue::structured([["1", "07850705290", "0", "A\u{1f}"]]),
        )
        .unwrap_err();
    assert!(matches!(err, NistError::Encoding { .. }));
}

#[test]
fn edited_record_reports_no_stale_length() {
    let mut parsed = NistFile::parse(&latent_file().serialize().unwrap()).unwrap();
    let record = parsed.get_mut(9, 0).unwrap();
    assert_eq!(record.declared_length(), Some(266));

    record.set_field(4, "SS").unwrap();
    assert_eq!(record.declared_length(), None);

    let again = NistFile::parse(&parsed.serialize().unwrap()).unwrap();
    assert_eq!(again.get(9, 0).unwrap().declared_length(), Some(267));
}

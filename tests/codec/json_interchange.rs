//! JSON export and import of whole files.

use crate::common::*;
use nistcodec::json::{from_json, to_json};
use nistcodec::{FieldValue, NistError, NistFile};
use serde_json::json;

#[test]
fn latent_file_through_json() {
    let file = latent_file();
    let exported = to_json(&file, true).unwrap();

    assert_eq!(exported["1"]["0"]["2"], json!("0502"));
    assert_eq!(exported["1"]["0"]["3"], json!("1\u{1f}3\u{1e}2\u{1f}0\u{1e}9\u{1f}0\u{1e}13\u{1f}0"));
    assert_eq!(exported["9"]["0"]["8"], json!("12501870"));
    assert!(exported["9"]["0"].get("1").is_none());
    assert!(exported["13"]["0"]["999"].is_string());

    let imported = from_json(&exported).unwrap();
    assert_eq!(imported.keys().collect::<Vec<_>>(), file.keys().collect::<Vec<_>>());
    for (original, back) in file.records().zip(imported.records()) {
        assert!(original.content_eq(back), "{} changed", original.key());
    }
    assert_eq!(imported.serialize().unwrap(), file.serialize().unwrap());
}

#[test]
fn export_without_binary_drops_images() {
    let exported = to_json(&latent_file(), false).unwrap();
    assert!(exported["13"]["0"].get("999").is_none());
    assert_eq!(exported["13"]["0"]["6"], json!("500"));
}

#[test]
fn blob_in_text_field_keeps_its_kind() {
    let mut file = NistFile::new();
    file.add(9, 1, [(184, FieldValue::blob(vec![0x1C, 0x00, 0xFF]))]).unwrap();

    let exported = to_json(&file, true).unwrap();
    assert_eq!(exported["9"]["1"]["184"], json!({ "base64": "HAD/" }));

    let imported = from_json(&exported).unwrap();
    assert_eq!(
        imported.get(9, 1).unwrap().field(184),
        Some(&FieldValue::blob(vec![0x1C, 0x00, 0xFF]))
    );
}

#[test]
fn import_regenerates_the_manifest() {
    let document = json!({
        "1": { "0": { "3": "1\u{1f}0", "4": "TYPE" } },
        "2": { "4": { "4": "20240101" } },
        "14": { "1": { "3": "0", "999": "AAEC" } }
    });
    let file = from_json(&document).unwrap();
    assert_eq!(file.header().text(4), Some("TYPE"));
    assert_eq!(file.manifest().len(), 2);
    assert_eq!(
        file.get(14, 1).unwrap().field(999),
        Some(&FieldValue::blob(vec![0x00, 0x01, 0x02]))
    );
}

#[test]
fn import_rejects_malformed_documents() {
    for document in [
        json!([1, 2]),
        json!({ "two": {} }),
        json!({ "2": { "0": "flat" } }),
        json!({ "14": { "1": { "999": "not base64!" } } }),
    ] {
        let err = from_json(&document).unwrap_err();
        assert!(matches!(err, NistError::Json { .. }), "{}: {:?}", document, err);
    }
}

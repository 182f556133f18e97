//! Shared builders for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use nist_fingerprint::{AnnotationKind, AnnotationList, ColumnValue, FormatSpec};
use nistcodec::{CodecConfig, CodecOptions, FieldValue, NistFile};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness (shown with --nocapture).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    });
}

/// The ten reference minutiae: (i, x mm, y mm, theta, quality, designator)
pub const REFERENCE_MINUTIAE: [(i64, f64, f64, i64, i64, &str); 10] = [
    (1, 7.85, 7.05, 290, 0, "A"),
    (2, 13.80, 15.30, 155, 0, "A"),
    (3, 11.46, 22.32, 224, 0, "A"),
    (4, 22.61, 25.17, 194, 0, "A"),
    (5, 6.97, 8.48, 153, 0, "A"),
    (6, 12.58, 19.88, 346, 0, "A"),
    (7, 19.69, 19.80, 111, 0, "A"),
    (8, 12.31, 3.87, 147, 0, "A"),
    (9, 13.88, 14.29, 330, 0, "A"),
    (10, 15.47, 22.49, 271, 0, "A"),
];

/// Rows of `minutiae` in "ixytqd" order
pub fn minutiae_rows(minutiae: &[(i64, f64, f64, i64, i64, &str)]) -> Vec<Vec<ColumnValue>> {
    minutiae
        .iter()
        .map(|(i, x, y, t, q, d)| {
            vec![(*i).into(), (*x).into(), (*y).into(), (*t).into(), (*q).into(), (*d).into()]
        })
        .collect()
}

/// The reference minutiae as an annotation list
pub fn reference_minutiae() -> AnnotationList {
    let spec = FormatSpec::parse("ixytqd").expect("valid spec");
    AnnotationList::from_list(&minutiae_rows(&REFERENCE_MINUTIAE), &spec, AnnotationKind::Minutia)
        .expect("rows match spec")
}

/// One core at (12.5 mm, 18.7 mm)
pub fn reference_core() -> AnnotationList {
    let spec = FormatSpec::parse("xy").expect("valid spec");
    AnnotationList::from_list(&[vec![12.5.into(), 18.7.into()]], &spec, AnnotationKind::Core)
        .expect("rows match spec")
}

/// Latent transaction: Type-1, Type-2, Type-9 (ten minutiae, one core) and
/// an empty (white) 500x500 Type-13 image.
pub fn latent_file() -> NistFile {
    let mut file = NistFile::new();
    {
        let header = file.header_mut();
        header.set_field(4, "LFFS").expect("type of transaction");
        header.set_field(5, "20240101").expect("date");
        header.set_field(7, "DAI").expect("destination agency");
        header.set_field(8, "ORI").expect("originating agency");
        header.set_field(9, "TCN0001").expect("control number");
    }

    file.add(2, 0, [(4, "20240101")]).expect("Type-2");

    let record = file
        .add(
            9,
            0,
            [(3, "4"), (4, "S"), (6, "0"), (11, "0")],
        )
        .expect("Type-9");
    nist_fingerprint::set_cores(record, &reference_core()).expect("cores");
    nist_fingerprint::set_minutiae(record, &reference_minutiae()).expect("minutiae");

    file.add(
        13,
        0,
        [
            (3, FieldValue::scalar("0")),
            (6, FieldValue::scalar("500")),
            (7, FieldValue::scalar("500")),
            (8, FieldValue::scalar("1")),
            (9, FieldValue::scalar("500")),
            (10, FieldValue::scalar("500")),
            (11, FieldValue::scalar("NONE")),
            (12, FieldValue::scalar("8")),
            (999, FieldValue::blob(vec![0xFF; 500 * 500])),
        ],
    )
    .expect("Type-13");

    file
}

/// Default options with a small input bound
pub fn test_options() -> CodecOptions {
    CodecOptions::new().with_config(CodecConfig::for_testing())
}

/// Split a serialized file into its records, following the length fields.
///
/// Only for files without Type-4 records.
pub fn split_tagged_records(bytes: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let colon = rest.iter().position(|b| *b == b':').expect("tag");
        let end = rest
            .iter()
            .position(|b| *b == nistcodec::GS || *b == nistcodec::FS)
            .expect("length terminator");
        let len: usize = std::str::from_utf8(&rest[colon + 1..end])
            .expect("ascii")
            .parse()
            .expect("length");
        out.push(&rest[..len]);
        rest = &rest[len..];
    }
    out
}

//! nistcodec - Lossless codec for ANSI/NIST-ITL biometric interchange files
//!
//! Reads and writes the traditional encoding: Type-1 transaction header,
//! tagged records (Type-2, 9, 10, 13, 14, ...) and the binary Type-4 layout.
//!
//! # Quick Start
//!
//! ```ignore
//! use nistcodec::{NistFile, FieldValue};
//!
//! let mut file = NistFile::new();
//! file.add(2, 0, [(4, "20240101")])?;
//! let bytes = file.serialize()?;
//!
//! let parsed = NistFile::parse(&bytes)?;
//! assert_eq!(parsed.get(2, 0).unwrap().text(4), Some("20240101"));
//! ```
//!
//! # Architecture
//!
//! - `nist-core`: field values, record keys, schema table, errors
//! - `nist-codec`: separator codec, record assemblers, record store,
//!   manifest, vendor overrides
//! - `nist-fingerprint`: minutiae, cores, deltas, pairing and local
//!   quality on Type-9 records
//!
//! Vendor deviations are registered as field codecs in an
//! [`OverrideRegistry`] and selected per call through [`CodecOptions`].

pub use nist_codec::*;
pub use nist_core::{
    field_kind, record_schema, Blob, FieldKind, FieldNumber, FieldValue, Item, Location,
    NistError, RecordKey, RecordType, Result, Subfield, FS, GS, RS, US,
};

/// Fingerprint annotations (minutiae, cores, deltas, pairing, quality)
pub mod fingerprint {
    pub use nist_fingerprint::*;
}

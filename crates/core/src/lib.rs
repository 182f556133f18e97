//! Core types for NIST biometric interchange files
//!
//! This crate defines the foundational types used throughout the workspace:
//! - FieldValue: Scalar / Structured / Blob field values and their leaves
//! - RecordKey, Location, Tag: identities and positions inside a file
//! - Separators: FS, GS, RS, US
//! - Schema: record layouts and per-field value kinds
//! - NistError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod error;
pub mod schema; // record/field kind table
pub mod types;
pub mod value;

// Re-export commonly used types
pub use error::{NistError, Result};
pub use schema::{
    field_kind, header_schema, record_schema, FieldKind, FieldTwo, ImageGeometry, RecordEncoding, RecordSchema,
    BLOB_FIELD, MANIFEST_FIELD,
};
pub use types::{
    is_separator, separator_name, FieldNumber, Location, RecordKey, RecordType, Tag, FS, GS, RS,
    US,
};
pub use value::{Blob, FieldValue, Item, Subfield};

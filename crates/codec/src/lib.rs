//! Wire codec for ANSI/NIST-ITL transactions
//!
//! This crate turns bytes into a [`NistFile`] and back:
//!
//! - Separator codec: field values to and from GS/RS/US-delimited text
//! - Length manager: self-inclusive record lengths
//! - Record assemblers: tagged records and the binary Type-4 layout
//! - Record store: records keyed by (type, IDC) with a self-maintaining manifest
//! - Override registry: per-vendor field codecs
//! - JSON interchange

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary; // Type-4 fixed binary layout
pub mod codec; // File-level parse/serialize and the Codec facade
pub mod config; // CodecConfig, CodecOptions
pub mod file; // NistFile record store
pub mod geometry; // Image size checks
pub mod json; // JSON export/import
pub mod length; // Record length computation
pub mod manifest; // Field 1.003
pub mod overrides; // Vendor field codecs
pub mod record; // Record model and tagged assembler
pub mod separator; // Hierarchical separator codec

// === Re-exports ===
pub use codec::{parse, serialize, Codec};
pub use config::{
    CodecConfig, CodecConfigError, CodecOptions, LengthWidths, DEFAULT_LENGTH_WIDTH,
    MAX_LENGTH_WIDTH,
};
pub use file::{MergePolicy, NistFile, DEFAULT_VERSION};
pub use manifest::Manifest;
pub use overrides::{
    morpho_profile, Base64FieldCodec, FieldCodec, OverrideRegistry, ProfileSelector,
    ResolvedProfile, StandardFieldCodec, VendorProfile, MORPHO_PROFILE,
};
pub use record::Record;

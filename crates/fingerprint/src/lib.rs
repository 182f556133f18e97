//! Fingerprint annotations for NIST files
//!
//! Maps tabular minutiae, cores and deltas onto Type-9 fields:
//! - Annotation, FormatSpec: named-column rows and their column codes
//! - AnnotationList: ordered rows with geometry helpers
//! - AnnotationLayout: per-field wire layout (fixed-width scaled columns)
//! - LayoutTranscodeCodec: vendor layouts as field codec overrides
//! - minutiae pairing (9.255) and the local quality map (9.308)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotation;
pub mod fields; // Type-9 accessors
pub mod layout;
pub mod list;
pub mod quality; // 9.308 local quality map
pub mod transcode;
pub mod units; // mm <-> px

pub use annotation::{Annotation, AnnotationKind, ColumnValue, FormatSpec};
pub use fields::{
    check_minutiae, cores, deltas, image_size_mm, minutiae, minutiae_by_pairing_name,
    minutiae_paired, minutiae_with_pairing, paired_count, pairing, set_cores, set_deltas,
    set_minutiae, set_pairing,
};
pub use layout::{AnnotationLayout, ColumnFormat, ColumnType, ItemLayout};
pub use list::AnnotationList;
pub use quality::{minutiae_by_quality, minutiae_with_quality, quality_map, set_quality_map, Compression, QualityMap};
pub use transcode::LayoutTranscodeCodec;
pub use units::{mm_to_px, px_to_mm};

//! Record and field schema table
//!
//! Which record types exist, how they are laid out on the wire, and what kind
//! of value each field holds. Fields missing from the table are `Structured`,
//! which round-trips any user-defined content losslessly.

use crate::types::{FieldNumber, RecordType};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Shape of a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Single leaf; separators inside are an error
    Scalar,
    /// Subfields and items
    Structured,
    /// Raw bytes running to the end of the record
    Blob,
}

/// How a record type is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEncoding {
    /// ASCII `T.FFF:value` fields separated by GS, terminated by FS
    Tagged,
    /// Fixed binary header followed by image bytes (Type-4)
    Binary,
}

/// Meaning of field 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTwo {
    /// Standard version (Type-1)
    Version,
    /// Information designation character (every other type)
    Idc,
}

/// Fields describing the pixel payload of an image record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    /// Horizontal line length (pixels per row)
    pub width: FieldNumber,
    /// Vertical line length (rows)
    pub height: FieldNumber,
    /// Bits per pixel; `None` means the type is fixed at 8
    pub bits_per_pixel: Option<FieldNumber>,
    /// Compression algorithm field
    pub compression: FieldNumber,
}

/// Compression codes meaning "raw pixels"
pub const UNCOMPRESSED_CODES: [&str; 3] = ["0", "NONE", "RAW"];

/// Is `code` one of the uncompressed compression codes?
pub fn is_uncompressed(code: &str) -> bool {
    UNCOMPRESSED_CODES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(code.trim()))
}

/// Per record type schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    /// Record type number
    pub record_type: RecordType,
    /// Short human name
    pub name: &'static str,
    /// Wire layout
    pub encoding: RecordEncoding,
    /// Image geometry fields, when the type carries pixels
    pub geometry: Option<ImageGeometry>,
    /// Does field 999 hold binary data?
    pub has_blob: bool,
}

impl RecordSchema {
    /// Meaning of field 2 for this type
    pub fn field_two(&self) -> FieldTwo {
        if self.record_type == 1 {
            FieldTwo::Version
        } else {
            FieldTwo::Idc
        }
    }

    /// Highest IDC the wire layout can carry
    pub fn max_idc(&self) -> u32 {
        match self.encoding {
            RecordEncoding::Binary => u8::MAX as u32,
            RecordEncoding::Tagged => u32::MAX,
        }
    }
}

/// Field number of the binary payload in image records
pub const BLOB_FIELD: FieldNumber = 999;

/// Field number of the Type-1 content (manifest) field
pub const MANIFEST_FIELD: FieldNumber = 3;

const STANDARD_GEOMETRY: ImageGeometry = ImageGeometry {
    width: 6,
    height: 7,
    bits_per_pixel: Some(12),
    compression: 11,
};

const fn tagged(record_type: RecordType, name: &'static str) -> RecordSchema {
    RecordSchema {
        record_type,
        name,
        encoding: RecordEncoding::Tagged,
        geometry: None,
        has_blob: false,
    }
}

const fn tagged_image(
    record_type: RecordType,
    name: &'static str,
    geometry: Option<ImageGeometry>,
) -> RecordSchema {
    RecordSchema {
        record_type,
        name,
        encoding: RecordEncoding::Tagged,
        geometry,
        has_blob: true,
    }
}

static RECORD_SCHEMAS: [RecordSchema; 19] = [
    tagged(1, "Transaction information"),
    tagged(2, "User-defined descriptive text"),
    RecordSchema {
        record_type: 4,
        name: "High-resolution grayscale fingerprint image",
        encoding: RecordEncoding::Binary,
        geometry: Some(ImageGeometry {
            width: 6,
            height: 7,
            bits_per_pixel: None,
            compression: 8,
        }),
        has_blob: true,
    },
    tagged(9, "Minutiae data"),
    tagged_image(10, "Photographic body part imagery", None),
    tagged_image(11, "Forensic and investigatory voice data", None),
    tagged(12, "Forensic dental and oral data"),
    tagged_image(13, "Friction-ridge latent image", Some(STANDARD_GEOMETRY)),
    tagged_image(14, "Variable-resolution fingerprint image", Some(STANDARD_GEOMETRY)),
    tagged_image(15, "Variable-resolution palmprint image", Some(STANDARD_GEOMETRY)),
    tagged_image(16, "User-defined variable-resolution testing image", Some(STANDARD_GEOMETRY)),
    tagged_image(17, "Iris image", Some(STANDARD_GEOMETRY)),
    tagged(18, "DNA data"),
    tagged_image(19, "Variable-resolution plantar image", Some(STANDARD_GEOMETRY)),
    tagged_image(20, "Source representation", None),
    tagged_image(21, "Associated context", None),
    tagged_image(22, "Non-photographic imagery", None),
    tagged(98, "Information assurance"),
    tagged_image(99, "CBEFF biometric data", None),
];

static SCHEMA_INDEX: Lazy<HashMap<RecordType, &'static RecordSchema>> = Lazy::new(|| {
    RECORD_SCHEMAS
        .iter()
        .map(|s| (s.record_type, s))
        .collect()
});

/// Fields that hold exactly one leaf, besides field 1 and 2 of every type.
static SCALAR_FIELDS: Lazy<HashMap<RecordType, &'static [FieldNumber]>> = Lazy::new(|| {
    let mut table: HashMap<RecordType, &'static [FieldNumber]> = HashMap::new();
    // Type-1: version, type of transaction, date, priority, agencies, TCN/TCR,
    // scanning resolutions, GMT
    table.insert(1, &[4, 5, 6, 7, 8, 9, 10, 11, 12, 14]);
    // Type-4: binary header fields
    table.insert(4, &[3, 5, 6, 7, 8]);
    // Type-9: impression type, format, minutiae count, ridge counts indicator
    table.insert(9, &[3, 4, 6, 10, 11]);
    // Image records: impression, source date, geometry, scale, compression, bpp
    for rt in [13u8, 14, 15, 16, 17, 19] {
        table.insert(rt, &[3, 5, 6, 7, 8, 9, 10, 11, 12]);
    }
    table
});

/// Schema of `record_type`, or `None` when the type is not supported
pub fn record_schema(record_type: RecordType) -> Option<&'static RecordSchema> {
    SCHEMA_INDEX.get(&record_type).copied()
}

/// Schema of the Type-1 transaction record
pub fn header_schema() -> &'static RecordSchema {
    &RECORD_SCHEMAS[0]
}

/// Value kind of `record_type.field`
pub fn field_kind(record_type: RecordType, field: FieldNumber) -> FieldKind {
    if field == 1 || field == 2 {
        return FieldKind::Scalar;
    }
    let schema = record_schema(record_type);
    if field == BLOB_FIELD && schema.map(|s| s.has_blob).unwrap_or(false) {
        return FieldKind::Blob;
    }
    match SCALAR_FIELDS.get(&record_type) {
        Some(fields) if fields.contains(&field) => FieldKind::Scalar,
        _ => FieldKind::Structured,
    }
}

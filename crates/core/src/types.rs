//! Core types for NIST interchange files
//!
//! This module defines the foundational types:
//! - Separator bytes (FS, GS, RS, US)
//! - RecordKey: (record type, IDC) identity of a logical record
//! - Location: where in a file an error happened
//! - Tag: the `T.FFF:` prefix of a tagged field

use crate::error::{NistError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// File separator: terminates every tagged record.
pub const FS: u8 = 0x1C;
/// Group separator: between fields of a record.
pub const GS: u8 = 0x1D;
/// Record separator: between subfields of a field.
pub const RS: u8 = 0x1E;
/// Unit separator: between items of a subfield.
pub const US: u8 = 0x1F;

/// Separator bytes in hierarchy order, outermost first.
pub const SEPARATORS: [u8; 4] = [FS, GS, RS, US];

/// Returns true if `byte` is one of the four reserved separators.
#[inline]
pub fn is_separator(byte: u8) -> bool {
    (FS..=US).contains(&byte)
}

/// Short mnemonic for a separator byte, used in error messages.
pub fn separator_name(byte: u8) -> Option<&'static str> {
    match byte {
        FS => Some("FS"),
        GS => Some("GS"),
        RS => Some("RS"),
        US => Some("US"),
        _ => None,
    }
}

/// Record type number (1 = transaction header, 9 = minutiae, 13 = latent image, ...)
pub type RecordType = u8;

/// Field number inside a record (1..=999)
pub type FieldNumber = u16;

/// Highest field number a tag can carry.
pub const MAX_FIELD_NUMBER: FieldNumber = 999;

/// Identity of a logical record inside a file.
///
/// The derived ordering (type first, then IDC) is the serialization order:
/// Type-1 sorts first because it has the smallest type number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Record type number
    pub record_type: RecordType,
    /// Information designation character
    pub idc: u32,
}

impl RecordKey {
    /// Create a new key
    pub const fn new(record_type: RecordType, idc: u32) -> Self {
        Self { record_type, idc }
    }

    /// Key of the transaction header (Type-1, IDC 0)
    pub const fn header() -> Self {
        Self::new(1, 0)
    }

    /// Is this the Type-1 header key?
    pub fn is_header(&self) -> bool {
        self.record_type == 1
    }

    /// Location pointing at this record
    pub fn location(&self) -> Location {
        Location::record(self.record_type, self.idc)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type-{:02} IDC {}", self.record_type, self.idc)
    }
}

/// Where an error occurred.
///
/// Every part is optional: a failure while reading the length digits of an
/// unknown record knows nothing but the byte offset, a failure inside a
/// minutia layout knows the full (type, IDC, field) triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Record type, if known
    pub record_type: Option<RecordType>,
    /// IDC, if known
    pub idc: Option<u32>,
    /// Field number, if known
    pub field: Option<FieldNumber>,
}

impl Location {
    /// Location with nothing known
    pub const fn unknown() -> Self {
        Self {
            record_type: None,
            idc: None,
            field: None,
        }
    }

    /// Location of a whole record
    pub const fn record(record_type: RecordType, idc: u32) -> Self {
        Self {
            record_type: Some(record_type),
            idc: Some(idc),
            field: None,
        }
    }

    /// Location of a record type whose IDC is not yet known
    pub const fn record_type(record_type: RecordType) -> Self {
        Self {
            record_type: Some(record_type),
            idc: None,
            field: None,
        }
    }

    /// Narrow this location to a field
    pub const fn with_field(mut self, field: FieldNumber) -> Self {
        self.field = Some(field);
        self
    }

    /// Fill the parts unknown here from `outer`.
    pub fn or(self, outer: Location) -> Location {
        Location {
            record_type: self.record_type.or(outer.record_type),
            idc: self.idc.or(outer.idc),
            field: self.field.or(outer.field),
        }
    }

    /// True when nothing is known
    pub fn is_unknown(&self) -> bool {
        self.record_type.is_none() && self.idc.is_none() && self.field.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "<unknown location>");
        }
        let mut parts = Vec::with_capacity(3);
        if let Some(rt) = self.record_type {
            parts.push(format!("Type-{:02}", rt));
        }
        if let Some(idc) = self.idc {
            parts.push(format!("IDC {}", idc));
        }
        match (self.record_type, self.field) {
            (Some(rt), Some(field)) => parts.push(format!("field {}.{:03}", rt, field)),
            (None, Some(field)) => parts.push(format!("field {:03}", field)),
            _ => {}
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// A field tag: `T.FFF` followed by a colon on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Record type part
    pub record_type: RecordType,
    /// Field number part
    pub field: FieldNumber,
}

impl Tag {
    /// Create a tag
    pub const fn new(record_type: RecordType, field: FieldNumber) -> Self {
        Self { record_type, field }
    }

    /// Wire form including the trailing colon, e.g. `9.012:`
    pub fn render(&self) -> String {
        format!("{}.{:03}:", self.record_type, self.field)
    }

    /// Byte length of [`Tag::render`] without allocating
    pub fn rendered_len(&self) -> usize {
        let type_digits = match self.record_type {
            0..=9 => 1,
            10..=99 => 2,
            _ => 3,
        };
        type_digits + 1 + 3 + 1
    }

    /// Parse the bytes in front of a field's colon (`9.012`, `09.012`).
    ///
    /// `location` only feeds the error.
    pub fn parse(bytes: &[u8], location: Location) -> Result<Tag> {
        let invalid = |detail: String| NistError::InvalidTag { location, detail };

        let text = std::str::from_utf8(bytes)
            .map_err(|_| invalid(format!("non-ASCII tag bytes {:02X?}", bytes)))?;
        let (type_part, field_part) = text
            .split_once('.')
            .ok_or_else(|| invalid(format!("missing '.' in tag '{}'", text)))?;

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(type_part) || !all_digits(field_part) {
            return Err(invalid(format!("non-numeric tag '{}'", text)));
        }

        let record_type: RecordType = type_part
            .parse()
            .map_err(|_| invalid(format!("record type out of range in '{}'", text)))?;
        let field: FieldNumber = field_part
            .parse()
            .map_err(|_| invalid(format!("field number out of range in '{}'", text)))?;

        if record_type == 0 {
            return Err(invalid(format!("record type 0 in '{}'", text)));
        }
        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(invalid(format!("field number out of range in '{}'", text)));
        }

        Ok(Tag { record_type, field })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.record_type, self.field)
    }
}

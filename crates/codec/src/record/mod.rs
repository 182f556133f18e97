//! Logical records and their wire assemblers
//!
//! A [`Record`] is an ordered map from field number to [`FieldValue`] under a
//! (type, IDC) key. The key and the fields derived from it (length, IDC,
//! manifest) are owned by the file; everything else is set through
//! [`Record::set_field`], which enforces the field's schema kind.

pub mod tagged;

use nist_core::{
    field_kind, FieldKind, FieldNumber, FieldTwo, FieldValue, Location, NistError,
    RecordEncoding, RecordKey, RecordSchema, RecordType, Result, MANIFEST_FIELD,
};
use std::collections::BTreeMap;

/// One logical record of a NIST file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: RecordKey,
    schema: &'static RecordSchema,
    fields: BTreeMap<FieldNumber, FieldValue>,
}

impl Record {
    pub(crate) fn new(schema: &'static RecordSchema, idc: u32) -> Self {
        Record {
            key: RecordKey::new(schema.record_type, idc),
            schema,
            fields: BTreeMap::new(),
        }
    }

    /// (type, IDC) key
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Record type number
    pub fn record_type(&self) -> RecordType {
        self.key.record_type
    }

    /// Information designation character
    pub fn idc(&self) -> u32 {
        self.key.idc
    }

    /// Schema of this record's type
    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    /// Location of this record, for errors
    pub fn location(&self) -> Location {
        self.key.location()
    }

    /// Value of field `field`
    pub fn field(&self, field: FieldNumber) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Scalar text of field `field`
    pub fn text(&self, field: FieldNumber) -> Option<&str> {
        self.field(field).and_then(FieldValue::as_str)
    }

    /// Is field `field` present?
    pub fn contains(&self, field: FieldNumber) -> bool {
        self.fields.contains_key(&field)
    }

    /// Fields in ascending field-number order
    pub fn fields(&self) -> impl Iterator<Item = (FieldNumber, &FieldValue)> + '_ {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    /// Present field numbers in ascending order
    pub fn field_numbers(&self) -> impl Iterator<Item = FieldNumber> + '_ {
        self.fields.keys().copied()
    }

    /// Number of fields, field 1 included when present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// No fields at all?
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Length stated in field 1, when the record came from a parse.
    ///
    /// `None` once the record is edited: any mutation drops field 1, and the
    /// length is computed again on serialization.
    pub fn declared_length(&self) -> Option<usize> {
        self.text(1).and_then(|t| t.parse().ok())
    }

    /// Set a field, converting the value to its schema kind.
    ///
    /// # Errors
    ///
    /// - `ReservedField` for field 1, the IDC field, and the Type-1 manifest
    /// - `InvalidField` for field numbers outside 1..=999, fields the Type-4
    ///   layout cannot carry, or a multi-leaf value in a single-valued field
    /// - `Encoding` if a leaf contains a separator byte
    pub fn set_field(&mut self, field: FieldNumber, value: impl Into<FieldValue>) -> Result<()> {
        self.check_settable(field)?;
        let location = self.location().with_field(field);
        let value = conform(value.into(), field_kind(self.record_type(), field), location)?;
        self.fields.insert(field, value);
        self.remove_length();
        Ok(())
    }

    /// Remove a field, returning its value.
    ///
    /// The same fields as in [`Record::set_field`] are reserved.
    pub fn remove_field(&mut self, field: FieldNumber) -> Result<Option<FieldValue>> {
        self.check_settable(field)?;
        let removed = self.fields.remove(&field);
        if removed.is_some() {
            self.remove_length();
        }
        Ok(removed)
    }

    /// Compare two records ignoring their length fields.
    pub fn content_eq(&self, other: &Record) -> bool {
        self.key == other.key
            && self
                .fields
                .iter()
                .filter(|(n, _)| **n != 1)
                .eq(other.fields.iter().filter(|(n, _)| **n != 1))
    }

    /// Store a value without schema checks (decoder and file bookkeeping).
    pub(crate) fn insert_raw(&mut self, field: FieldNumber, value: FieldValue) {
        self.fields.insert(field, value);
    }

    /// Drop the length field carried over from a parse.
    pub(crate) fn remove_length(&mut self) {
        self.fields.remove(&1);
    }

    /// Re-key the record after its IDC field was read from the wire.
    pub(crate) fn rekey(&mut self, idc: u32) {
        self.key.idc = idc;
    }

    /// Re-key the record and rewrite its IDC field.
    pub(crate) fn set_idc(&mut self, idc: u32) {
        self.key.idc = idc;
        if self.schema.field_two() == FieldTwo::Idc {
            self.fields.insert(2, FieldValue::scalar(idc.to_string()));
            self.remove_length();
        }
    }

    fn check_settable(&self, field: FieldNumber) -> Result<()> {
        let location = self.location().with_field(field);
        let reserved = |detail: &str| NistError::ReservedField {
            location,
            detail: detail.to_string(),
        };

        if field == 0 || field > nist_core::types::MAX_FIELD_NUMBER {
            return Err(NistError::invalid_field(
                location,
                format!("field number {} outside 1..=999", field),
            ));
        }
        if field == 1 {
            return Err(reserved("record length is computed on serialization"));
        }
        if field == 2 && self.schema.field_two() == FieldTwo::Idc {
            return Err(reserved("the IDC is owned by the file, use NistFile::move_idc"));
        }
        if self.key.is_header() && field == MANIFEST_FIELD {
            return Err(reserved("the manifest is regenerated by the file"));
        }
        if self.schema.encoding == RecordEncoding::Binary
            && !((3..=8).contains(&field) || field == nist_core::BLOB_FIELD)
        {
            return Err(NistError::invalid_field(
                location,
                format!("the binary Type-{:02} layout has no field {}", self.record_type(), field),
            ));
        }
        Ok(())
    }
}

/// Convert `value` to the representation `kind` stores.
pub(crate) fn conform(value: FieldValue, kind: FieldKind, location: Location) -> Result<FieldValue> {
    let value = match (kind, value.canonical()) {
        (FieldKind::Blob, FieldValue::Scalar(item)) => FieldValue::blob(item.into_bytes()),
        (FieldKind::Blob, FieldValue::Structured(_)) => {
            return Err(NistError::invalid_field(
                location,
                "structured value in a binary field",
            ))
        }
        (FieldKind::Scalar, v @ FieldValue::Structured(_)) => {
            return Err(NistError::invalid_field(
                location,
                format!("{} leaves in a single-valued field", v.leaf_count()),
            ))
        }
        (_, v) => v,
    };
    value.validate_leaves(location)?;
    Ok(value)
}

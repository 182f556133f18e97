//! Hierarchical separator codec
//!
//! Turns a [`FieldValue`] into the bytes between a field's colon and the
//! next GS, and back. Subfields are joined by RS, items by US. Blob payloads
//! bypass the separator rules entirely.

use nist_core::{FieldKind, FieldValue, Item, Location, NistError, Result, Subfield, RS, US};

/// Encode a field value for the wire.
///
/// # Errors
///
/// - `Encoding` if a scalar or item leaf contains a separator byte, or a
///   blob is stored in a field whose kind is not `Blob`
/// - `InvalidField` if a multi-leaf value is stored in a `Scalar` field
pub fn encode_value(value: &FieldValue, kind: FieldKind, location: Location) -> Result<Vec<u8>> {
    value.validate_leaves(location)?;
    match value {
        FieldValue::Scalar(item) => Ok(item.as_bytes().to_vec()),
        FieldValue::Structured(subfields) => {
            if kind == FieldKind::Scalar && value.leaf_count() > 1 {
                return Err(NistError::invalid_field(
                    location,
                    format!("{} leaves in a single-valued field", value.leaf_count()),
                ));
            }
            Ok(join(subfields))
        }
        FieldValue::Blob(blob) => {
            if kind != FieldKind::Blob {
                return Err(NistError::encoding(
                    location,
                    format!(
                        "binary value of {} bytes in a text field needs a vendor override",
                        blob.len()
                    ),
                ));
            }
            Ok(blob.as_bytes().to_vec())
        }
    }
}

/// Decode the value bytes of a field.
///
/// The result is canonical (see [`FieldValue::canonical`]).
///
/// # Errors
///
/// - `Encoding` if a `Scalar` field contains RS/US, or any leaf contains
///   GS/FS (which cannot occur inside a well-formed field)
pub fn decode_value(bytes: &[u8], kind: FieldKind, location: Location) -> Result<FieldValue> {
    let value = match kind {
        FieldKind::Blob => return Ok(FieldValue::blob(bytes)),
        FieldKind::Scalar => FieldValue::Scalar(Item::from(bytes)),
        FieldKind::Structured => FieldValue::Structured(split(bytes)).canonical(),
    };
    value.validate_leaves(location)?;
    Ok(value)
}

/// Byte length of the encoded value, without encoding it.
pub fn encoded_len(value: &FieldValue) -> usize {
    match value {
        FieldValue::Scalar(item) => item.len(),
        FieldValue::Blob(blob) => blob.len(),
        FieldValue::Structured(subfields) => {
            let leaves: usize = subfields
                .iter()
                .map(|s| s.iter().map(Item::len).sum::<usize>() + s.len().saturating_sub(1))
                .sum();
            leaves + subfields.len().saturating_sub(1)
        }
    }
}

fn join(subfields: &[Subfield]) -> Vec<u8> {
    let mut out = Vec::new();
    for (s, subfield) in subfields.iter().enumerate() {
        if s > 0 {
            out.push(RS);
        }
        for (i, item) in subfield.iter().enumerate() {
            if i > 0 {
                out.push(US);
            }
            out.extend_from_slice(item.as_bytes());
        }
    }
    out
}

fn split(bytes: &[u8]) -> Vec<Subfield> {
    bytes
        .split(|b| *b == RS)
        .map(|subfield| subfield.split(|b| *b == US).map(Item::from).collect())
        .collect()
}

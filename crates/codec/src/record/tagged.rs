//! Tagged record assembler
//!
//! Wire layout of every record type except Type-4:
//!
//! ```text
//! T.001:LLLLLLLL <GS> T.002:IDC <GS> ... <GS> T.999:<blob> <FS>
//! ```
//!
//! Fields are written in ascending field-number order. The length field is
//! computed, never copied from the model.

use super::Record;
use crate::config::CodecConfig;
use crate::geometry;
use crate::length;
use crate::overrides::ResolvedProfile;
use crate::separator;
use nist_core::{
    field_kind, is_separator, record_schema, separator_name, FieldKind, FieldNumber, FieldTwo,
    FieldValue, Location, NistError, RecordType, Result, Tag, FS, GS,
};
use tracing::trace;

/// Serialize a tagged record.
pub fn encode(record: &Record, profile: &ResolvedProfile<'_>, config: &CodecConfig) -> Result<Vec<u8>> {
    let record_type = record.record_type();
    let location = record.location();
    geometry::check(record, config)?;

    let mut encoded: Vec<(FieldNumber, Vec<u8>)> = Vec::with_capacity(record.len());
    for (field, value) in record.fields() {
        if field == 1 {
            continue;
        }
        let bytes = encode_field(record_type, field, value, profile, location)?;
        trace!(target: "nist::codec", record = %record.key(), field, bytes = bytes.len(), "Encoded field");
        encoded.push((field, bytes));
    }

    let width = config.length_widths.width_for(record_type);
    let total = length::tagged_record_length(
        record_type,
        encoded.iter().map(|(field, bytes)| (*field, bytes.len())),
        width,
    );
    let digits = length::render_length(total, width, location.with_field(1))?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(Tag::new(record_type, 1).render().as_bytes());
    out.extend_from_slice(digits.as_bytes());
    for (field, bytes) in &encoded {
        out.push(GS);
        out.extend_from_slice(Tag::new(record_type, *field).render().as_bytes());
        out.extend_from_slice(bytes);
    }
    out.push(FS);
    debug_assert_eq!(out.len(), total);

    trace!(target: "nist::codec", record = %record.key(), length = total, "Encoded record");
    Ok(out)
}

/// Parse one tagged record starting at `offset`.
///
/// `expected` is the record type the manifest announces for this position.
/// Returns the record and the number of bytes it occupies.
pub fn decode(
    input: &[u8],
    offset: usize,
    expected: RecordType,
    profile: &ResolvedProfile<'_>,
    config: &CodecConfig,
) -> Result<(Record, usize)> {
    let rest = &input[offset..];
    let base = Location::record_type(expected);
    let truncated = |needed: usize| NistError::TruncatedInput {
        location: base,
        offset,
        needed,
        available: rest.len(),
    };

    // Field 1: "T.001:<digits>" up to the first GS (or FS for a bare record)
    let colon = match rest.iter().position(|b| *b == b':' || is_separator(*b)) {
        Some(pos) if rest[pos] == b':' => pos,
        Some(_) => {
            return Err(NistError::InvalidTag {
                location: base,
                detail: "record does not start with a tagged field".to_string(),
            })
        }
        None => return Err(truncated(rest.len() + 1)),
    };
    let tag = Tag::parse(&rest[..colon], base)?;
    if tag.record_type != expected {
        return Err(NistError::manifest(
            base,
            format!(
                "manifest announces Type-{:02} at offset {}, found Type-{:02}",
                expected, offset, tag.record_type
            ),
        ));
    }
    if tag.field != 1 {
        return Err(NistError::InvalidTag {
            location: base,
            detail: format!("record starts with {} instead of its length field", tag),
        });
    }
    let schema = record_schema(expected).ok_or(NistError::UnsupportedRecordType { location: base })?;

    let digits_start = colon + 1;
    let digits_end = match rest[digits_start..].iter().position(|b| *b == GS || *b == FS) {
        Some(pos) => digits_start + pos,
        None => return Err(truncated(rest.len() + 1)),
    };
    let declared = length::parse_declared(&rest[digits_start..digits_end], base)?;

    if declared > rest.len() {
        return Err(truncated(declared));
    }
    let first_fs = || {
        rest.iter()
            .position(|b| *b == FS)
            .map(|p| p + 1)
            .unwrap_or(rest.len())
    };
    if declared <= digits_end || rest[declared - 1] != FS {
        return Err(NistError::LengthMismatch {
            location: base,
            declared,
            actual: first_fs(),
        });
    }
    if rest[digits_end] == FS && digits_end != declared - 1 {
        return Err(NistError::LengthMismatch {
            location: base,
            declared,
            actual: digits_end + 1,
        });
    }

    let body = &rest[..declared - 1];
    let mut record = Record::new(schema, 0);
    record.insert_raw(1, FieldValue::scalar(&body[digits_start..digits_end]));

    let mut pos = digits_end;
    while pos < body.len() {
        // body[pos] is the GS in front of the next field
        let start = pos + 1;
        let colon = match body[start..].iter().position(|b| *b == b':' || *b == GS) {
            Some(p) if body[start + p] == b':' => start + p,
            _ => {
                return Err(NistError::InvalidTag {
                    location: record.location().or(base),
                    detail: format!("field at record offset {} has no tag", start),
                })
            }
        };
        let tag = Tag::parse(&body[start..colon], base)?;
        if tag.record_type != expected {
            return Err(NistError::InvalidTag {
                location: base.with_field(tag.field),
                detail: format!("tag {} inside a Type-{:02} record", tag, expected),
            });
        }
        if record.contains(tag.field) {
            return Err(NistError::InvalidTag {
                location: base.with_field(tag.field),
                detail: format!("duplicate field {}", tag),
            });
        }

        let kind = field_kind(expected, tag.field);
        let value_start = colon + 1;
        let value_end = match kind {
            FieldKind::Blob => body.len(),
            _ => body[value_start..]
                .iter()
                .position(|b| *b == GS)
                .map(|p| value_start + p)
                .unwrap_or(body.len()),
        };
        let raw = &body[value_start..value_end];
        if kind != FieldKind::Blob {
            if let Some(p) = raw.iter().position(|b| *b == FS) {
                return Err(NistError::LengthMismatch {
                    location: base,
                    declared,
                    actual: value_start + p + 1,
                });
            }
        }

        let location = base.with_field(tag.field);
        let value = match profile.codec_for(expected, tag.field) {
            Some(codec) => {
                trace!(target: "nist::codec", tag = %tag, codec = codec.codec_id(), "Vendor override");
                codec.decode(raw, &location).map_err(|e| e.at(location))?
            }
            None => separator::decode_value(raw, kind, location)?,
        };
        trace!(target: "nist::codec", tag = %tag, bytes = raw.len(), "Decoded field");
        record.insert_raw(tag.field, value);
        pos = value_end;
    }

    if schema.field_two() == FieldTwo::Idc {
        let idc = parse_idc(&record, base)?;
        record.rekey(idc);
    }
    geometry::check(&record, config)?;

    trace!(target: "nist::codec", record = %record.key(), length = declared, "Decoded record");
    Ok((record, declared))
}

fn parse_idc(record: &Record, base: Location) -> Result<u32> {
    let location = base.with_field(2);
    let text = record
        .text(2)
        .ok_or_else(|| NistError::invalid_field(location, "missing IDC field"))?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NistError::invalid_field(
            location,
            format!("IDC '{}' is not a decimal number", text),
        ));
    }
    text.parse()
        .map_err(|_| NistError::invalid_field(location, format!("IDC '{}' out of range", text)))
}

fn encode_field(
    record_type: RecordType,
    field: FieldNumber,
    value: &FieldValue,
    profile: &ResolvedProfile<'_>,
    location: Location,
) -> Result<Vec<u8>> {
    let location = location.with_field(field);
    let kind = field_kind(record_type, field);
    let bytes = match profile.codec_for(record_type, field) {
        Some(codec) => codec.encode(value, &location).map_err(|e| e.at(location))?,
        None => separator::encode_value(value, kind, location)?,
    };
    if kind != FieldKind::Blob {
        if let Some(pos) = bytes.iter().position(|b| *b == GS || *b == FS) {
            return Err(NistError::encoding(
                location,
                format!(
                    "{} byte at position {} of the encoded value",
                    separator_name(bytes[pos]).unwrap_or("separator"),
                    pos
                ),
            ));
        }
    }
    Ok(bytes)
}

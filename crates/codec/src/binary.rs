//! Binary Type-4 records
//!
//! # Binary Format
//!
//! ```text
//! LEN(4) IDC(1) IMP(1) FGP(6) ISR(1) HLL(2) VLL(2) GCA(1) DATA
//! ```
//!
//! All integers are big-endian. LEN counts the whole record, header
//! included. No separator follows the record.
//!
//! In the model the header fields are fields 1 to 8, as decimal text, and
//! the pixels are field 999. Field 4 lists the finger positions of the FGP
//! block; unused slots (255) at the end are implied.

use crate::config::CodecConfig;
use crate::geometry;
use crate::length::{self, BINARY_HEADER_LEN};
use crate::record::Record;
use byteorder::{BigEndian, ByteOrder};
use nist_core::{
    record_schema, FieldNumber, FieldValue, Location, NistError, RecordKey, RecordType, Result,
    BLOB_FIELD,
};
use tracing::trace;

/// Record type of the binary layout
pub const BINARY_RECORD_TYPE: RecordType = 4;

const FGP_SLOTS: usize = 6;
const FGP_UNUSED: u8 = 255;

/// Serialize a Type-4 record.
pub fn encode(record: &Record, config: &CodecConfig) -> Result<Vec<u8>> {
    let location = record.location();
    geometry::check(record, config)?;

    let idc = u8::try_from(record.idc()).map_err(|_| {
        NistError::encoding(
            location.with_field(2),
            format!("IDC {} does not fit in one byte", record.idc()),
        )
    })?;
    let data: &[u8] = match record.field(BLOB_FIELD) {
        Some(value) => value.as_bytes().ok_or_else(|| {
            NistError::invalid_field(location.with_field(BLOB_FIELD), "image data must be binary")
        })?,
        None => &[],
    };
    let len = length::binary_record_length(data.len(), location.with_field(1))?;

    let mut header = [0u8; BINARY_HEADER_LEN];
    BigEndian::write_u32(&mut header[0..4], len);
    header[4] = idc;
    header[5] = byte_field(record, 3)?;
    header[6..12].copy_from_slice(&finger_positions(record)?);
    header[12] = byte_field(record, 5)?;
    BigEndian::write_u16(&mut header[13..15], word_field(record, 6)?);
    BigEndian::write_u16(&mut header[15..17], word_field(record, 7)?);
    header[17] = byte_field(record, 8)?;

    let mut out = Vec::with_capacity(len as usize);
    out.extend_from_slice(&header);
    out.extend_from_slice(data);

    trace!(target: "nist::codec", record = %record.key(), length = len, "Encoded binary record");
    Ok(out)
}

/// Parse one Type-4 record starting at `offset`.
pub fn decode(input: &[u8], offset: usize, config: &CodecConfig) -> Result<(Record, usize)> {
    let rest = &input[offset..];
    let base = Location::record_type(BINARY_RECORD_TYPE);
    let truncated = |needed: usize| NistError::TruncatedInput {
        location: base,
        offset,
        needed,
        available: rest.len(),
    };

    if rest.len() < 4 {
        return Err(truncated(4));
    }
    let declared = BigEndian::read_u32(&rest[0..4]) as usize;
    if declared < BINARY_HEADER_LEN {
        return Err(NistError::LengthMismatch {
            location: base,
            declared,
            actual: BINARY_HEADER_LEN,
        });
    }
    if declared > rest.len() {
        return Err(truncated(declared));
    }

    let schema = record_schema(BINARY_RECORD_TYPE)
        .ok_or(NistError::UnsupportedRecordType { location: base })?;
    let idc = rest[4] as u32;
    let mut record = Record::new(schema, idc);
    let mut put = |field: FieldNumber, text: String| record.insert_raw(field, FieldValue::scalar(text));

    put(1, declared.to_string());
    put(2, idc.to_string());
    put(3, rest[5].to_string());
    put(5, rest[12].to_string());
    put(6, BigEndian::read_u16(&rest[13..15]).to_string());
    put(7, BigEndian::read_u16(&rest[15..17]).to_string());
    put(8, rest[17].to_string());

    let fgp = &rest[6..12];
    let used = fgp
        .iter()
        .rposition(|b| *b != FGP_UNUSED)
        .map(|p| p + 1)
        .unwrap_or(1);
    let positions: Vec<String> = fgp[..used].iter().map(|b| b.to_string()).collect();
    record.insert_raw(4, FieldValue::structured([positions]));
    record.insert_raw(
        BLOB_FIELD,
        FieldValue::blob(&rest[BINARY_HEADER_LEN..declared]),
    );

    geometry::check(&record, config)?;
    trace!(target: "nist::codec", record = %RecordKey::new(BINARY_RECORD_TYPE, idc), length = declared, "Decoded binary record");
    Ok((record, declared))
}

fn number_field(record: &Record, field: FieldNumber, max: u64) -> Result<u64> {
    let location = record.location().with_field(field);
    let text = record
        .text(field)
        .ok_or_else(|| NistError::invalid_field(location, "missing header field"))?;
    parse_bounded(text, max, location)
}

fn parse_bounded(text: &str, max: u64, location: Location) -> Result<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NistError::invalid_field(
            location,
            format!("'{}' is not a decimal number", text),
        ));
    }
    match text.parse::<u64>() {
        Ok(n) if n <= max => Ok(n),
        _ => Err(NistError::encoding(
            location,
            format!("{} does not fit in the binary header (max {})", text, max),
        )),
    }
}

fn byte_field(record: &Record, field: FieldNumber) -> Result<u8> {
    number_field(record, field, u8::MAX as u64).map(|n| n as u8)
}

fn word_field(record: &Record, field: FieldNumber) -> Result<u16> {
    number_field(record, field, u16::MAX as u64).map(|n| n as u16)
}

fn finger_positions(record: &Record) -> Result<[u8; FGP_SLOTS]> {
    let location = record.location().with_field(4);
    let value = record
        .field(4)
        .ok_or_else(|| NistError::invalid_field(location, "missing finger position"))?;
    let subfields = value.subfields();
    if subfields.len() != 1 || subfields[0].len() > FGP_SLOTS {
        return Err(NistError::encoding(
            location,
            format!("at most {} finger positions fit in the header", FGP_SLOTS),
        ));
    }

    let mut slots = [FGP_UNUSED; FGP_SLOTS];
    for (slot, item) in slots.iter_mut().zip(subfields[0].iter()) {
        let text = item
            .as_str()
            .ok_or_else(|| NistError::invalid_field(location, "finger position is not text"))?;
        *slot = parse_bounded(text, u8::MAX as u64, location)? as u8;
    }
    Ok(slots)
}

//! Length manager
//!
//! The length field of a tagged record counts every byte of the serialized
//! record, itself included: tags, values, the GS between fields and the
//! closing FS. Its digit width is fixed by configuration, so the total is
//! known after a single measuring pass over the other fields.

use nist_core::{FieldNumber, Location, NistError, RecordType, Result, Tag};

/// Length of the Type-4 fixed header.
pub const BINARY_HEADER_LEN: usize = 18;

/// Total serialized length of a tagged record.
///
/// `fields` yields `(field number, encoded value length)` for every field
/// except field 1.
pub fn tagged_record_length<I>(record_type: RecordType, fields: I, width: usize) -> usize
where
    I: IntoIterator<Item = (FieldNumber, usize)>,
{
    let mut total = Tag::new(record_type, 1).rendered_len() + width;
    let mut count = 1;
    for (field, value_len) in fields {
        total += Tag::new(record_type, field).rendered_len() + value_len;
        count += 1;
    }
    // one GS between consecutive fields, one FS after the last
    total + count
}

/// Zero-padded decimal rendering of `length` in `width` digits.
///
/// # Errors
///
/// `LengthOverflow` if `length` needs more than `width` digits.
pub fn render_length(length: usize, width: usize, location: Location) -> Result<String> {
    let digits = length.to_string();
    if digits.len() > width {
        return Err(NistError::LengthOverflow {
            location,
            length,
            width,
        });
    }
    Ok(format!("{:0width$}", length, width = width))
}

/// Parse the declared length digits of a record.
///
/// Any number of digits is accepted; the configured width only governs output.
pub fn parse_declared(digits: &[u8], location: Location) -> Result<usize> {
    let invalid = || {
        NistError::invalid_field(
            location.with_field(1),
            format!(
                "length field '{}' is not a decimal number",
                String::from_utf8_lossy(digits)
            ),
        )
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    std::str::from_utf8(digits)
        .map_err(|_| invalid())?
        .parse::<usize>()
        .map_err(|_| invalid())
}

/// Total length of a Type-4 record carrying `image_len` bytes of pixels.
pub fn binary_record_length(image_len: usize, location: Location) -> Result<u32> {
    let total = BINARY_HEADER_LEN + image_len;
    u32::try_from(total).map_err(|_| NistError::LengthOverflow {
        location,
        length: total,
        width: 4,
    })
}

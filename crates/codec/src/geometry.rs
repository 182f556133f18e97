//! Image geometry check
//!
//! An uncompressed pixel payload must hold exactly `width * height * bpp`
//! bits, rounded up to whole bytes. Records whose geometry fields are absent or non-numeric, or whose
//! compression field names a real codec, are not checked.

use crate::config::CodecConfig;
use crate::record::Record;
use nist_core::{schema::is_uncompressed, FieldNumber, NistError, Result, BLOB_FIELD};

/// Verify the blob of `record` against its declared geometry.
pub fn check(record: &Record, config: &CodecConfig) -> Result<()> {
    if !config.check_image_geometry {
        return Ok(());
    }
    let Some(geometry) = record.schema().geometry else {
        return Ok(());
    };
    let Some(blob) = record.field(BLOB_FIELD).and_then(|v| v.as_blob()) else {
        return Ok(());
    };

    match record.text(geometry.compression) {
        Some(code) if is_uncompressed(code) => {}
        _ => return Ok(()),
    }

    let number = |field: FieldNumber| record.text(field).and_then(|t| t.trim().parse::<usize>().ok());
    let (Some(width), Some(height)) = (number(geometry.width), number(geometry.height)) else {
        return Ok(());
    };
    let bits_per_pixel = match geometry.bits_per_pixel {
        Some(field) => match number(field) {
            Some(bpp) => bpp,
            None => return Ok(()),
        },
        None => 8,
    };

    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(bits_per_pixel))
        .and_then(|bits| bits.checked_add(7))
        .map(|bits| bits / 8);
    match expected {
        Some(expected) if expected == blob.len() => Ok(()),
        Some(expected) => Err(NistError::LengthMismatch {
            location: record.location().with_field(BLOB_FIELD),
            declared: expected,
            actual: blob.len(),
        }),
        None => Err(NistError::invalid_field(
            record.location().with_field(geometry.width),
            format!("image geometry {}x{}x{} overflows", width, height, bits_per_pixel),
        )),
    }
}

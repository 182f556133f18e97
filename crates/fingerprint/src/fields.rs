//! Annotation access on Type-9 records
//!
//! Reads and writes minutiae (9.012), cores (9.008) and deltas (9.009)
//! through the standard layouts. Writing minutiae keeps the count in 9.010.
//!
//! Minutiae pairing lives in the user-defined field 9.255, one `i<US>n` row
//! per minutia, where `n` is the pairing name or `None` for an unpaired
//! minutia.

use crate::annotation::{Annotation, AnnotationKind};
use crate::layout::AnnotationLayout;
use crate::list::AnnotationList;
use crate::units;
use nist_codec::{NistFile, Record};
use nist_core::{FieldNumber, Location, NistError, RecordType, Result};
use std::collections::HashMap;
use tracing::debug;

/// Minutiae record type
pub const MINUTIAE_RECORD: RecordType = 9;
/// Core positions
pub const CORE_FIELD: FieldNumber = 8;
/// Delta positions
pub const DELTA_FIELD: FieldNumber = 9;
/// Number of minutiae
pub const MINUTIAE_COUNT_FIELD: FieldNumber = 10;
/// Minutiae
pub const MINUTIAE_FIELD: FieldNumber = 12;
/// Minutiae pairing (user-defined)
pub const PAIRING_FIELD: FieldNumber = 255;
/// Pairing name written for a minutia without a mate
pub const UNPAIRED: &str = "None";

/// Image records searched for the size of a Type-9's image, in order
const IMAGE_RECORDS: [RecordType; 2] = [13, 14];

/// Minutiae of a Type-9 record; empty when 9.012 is absent.
pub fn minutiae(record: &Record) -> Result<AnnotationList> {
    read(record, MINUTIAE_FIELD, AnnotationKind::Minutia)
}

/// Replace the minutiae and their count; returns the count.
pub fn set_minutiae(record: &mut Record, list: &AnnotationList) -> Result<usize> {
    write(record, MINUTIAE_FIELD, list)?;
    record.set_field(MINUTIAE_COUNT_FIELD, list.len().to_string())?;
    Ok(list.len())
}

/// Cores of a Type-9 record
pub fn cores(record: &Record) -> Result<AnnotationList> {
    read(record, CORE_FIELD, AnnotationKind::Core)
}

/// Replace the cores
pub fn set_cores(record: &mut Record, list: &AnnotationList) -> Result<()> {
    write(record, CORE_FIELD, list)
}

/// Deltas of a Type-9 record
pub fn deltas(record: &Record) -> Result<AnnotationList> {
    read(record, DELTA_FIELD, AnnotationKind::Delta)
}

/// Replace the deltas
pub fn set_deltas(record: &mut Record, list: &AnnotationList) -> Result<()> {
    write(record, DELTA_FIELD, list)
}

/// Paired rows of 9.255, columns `i` and `n`.
///
/// Rows marked unpaired are skipped; an absent field reads as no pairing.
pub fn pairing(record: &Record) -> Result<AnnotationList> {
    let mut rows = read(record, PAIRING_FIELD, AnnotationKind::Pairing)?;
    rows.retain(|row| row.pairing_name().map_or(false, |n| n != UNPAIRED));
    Ok(rows)
}

/// Number of paired minutiae
pub fn paired_count(record: &Record) -> Result<usize> {
    Ok(pairing(record)?.len())
}

/// Write 9.255 from `pairs`, rows of minutia index `i` and name `n`.
///
/// One row is written for every current minutia, in minutiae order; a
/// minutia without an entry in `pairs` is marked unpaired. Without minutiae
/// the field is removed. Returns the number of paired minutiae.
pub fn set_pairing(record: &mut Record, pairs: &AnnotationList) -> Result<usize> {
    let names: HashMap<i64, String> = pairs
        .iter()
        .filter_map(|p| Some((index_of(p)?, p.pairing_name()?)))
        .filter(|(_, name)| name != UNPAIRED)
        .collect();
    let list = minutiae(record)?;
    let paired = write_pairing(record, &list, |m| index_of(m).and_then(|i| names.get(&i).cloned()))?;
    if paired < names.len() {
        debug!(target: "nist::fingerprint", ignored = names.len() - paired, "Pairing names without a minutia");
    }
    Ok(paired)
}

/// Minutiae with their pairing name in column `n`; unpaired minutiae have
/// no `n` column.
pub fn minutiae_with_pairing(record: &Record) -> Result<AnnotationList> {
    let names: HashMap<i64, String> = pairing(record)?
        .iter()
        .filter_map(|p| Some((index_of(p)?, p.pairing_name()?)))
        .collect();
    let mut list = minutiae(record)?;
    for m in list.iter_mut() {
        if let Some(name) = index_of(m).and_then(|i| names.get(&i)) {
            m.set('n', name.as_str());
        }
    }
    Ok(list)
}

/// Paired minutiae only, with their pairing name in column `n`
pub fn minutiae_paired(record: &Record) -> Result<AnnotationList> {
    Ok(minutiae_with_pairing(record)?.get_paired())
}

/// Minutiae paired under one of `names`, in minutiae order.
///
/// # Errors
///
/// `PairingNotFound` for the first name no minutia carries.
pub fn minutiae_by_pairing_name(record: &Record, names: &[&str]) -> Result<AnnotationList> {
    let found = minutiae_with_pairing(record)?.get_by_pairing_name(names);
    for name in names {
        if !found.iter().any(|m| m.pairing_name().as_deref() == Some(*name)) {
            return Err(NistError::PairingNotFound {
                location: record.location().with_field(PAIRING_FIELD),
                name: name.to_string(),
            });
        }
    }
    Ok(found)
}

/// Drop the minutiae of Type-9 `idc` that fall outside its image.
///
/// The image is the Type-13 (or Type-14) record with the same IDC; its size
/// and resolution come from fields 6, 7, 8, 9 and 10. Remaining minutiae are
/// renumbered from 1 and keep their pairing name in 9.255. Returns the
/// number dropped.
pub fn check_minutiae(file: &mut NistFile, idc: u32) -> Result<usize> {
    let (width, height) = image_size(file, idc)?;

    let record = file
        .get_mut(MINUTIAE_RECORD, idc)
        .ok_or(NistError::RecordNotFound {
            location: Location::record(MINUTIAE_RECORD, idc),
        })?;
    let mut list = minutiae_with_pairing(record)?;
    if list.is_empty() {
        return Ok(0);
    }
    let dropped = list.retain_within(width, height);
    set_minutiae(record, &list)?;
    if record.field(PAIRING_FIELD).is_some() {
        write_pairing(record, &list, Annotation::pairing_name)?;
    }
    debug!(target: "nist::fingerprint", idc, dropped, kept = list.len(), "Checked minutiae against image");
    Ok(dropped)
}

/// Size in millimetres of the image paired with Type-9 `idc`.
pub(crate) fn image_size(file: &NistFile, idc: u32) -> Result<(f64, f64)> {
    let image = IMAGE_RECORDS
        .iter()
        .find_map(|rt| file.get(*rt, idc))
        .ok_or(NistError::RecordNotFound {
            location: Location::record(IMAGE_RECORDS[0], idc),
        })?;
    image_size_mm(image)
}

/// Image size in millimetres from the geometry fields of an image record.
///
/// # Errors
///
/// `InvalidField` when a size or resolution field is missing or not a
/// number, or the scale units (field 8) are neither 1 (ppi) nor 2 (ppcm).
pub fn image_size_mm(image: &Record) -> Result<(f64, f64)> {
    let number = |field: FieldNumber| -> Result<f64> {
        image
            .text(field)
            .and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|n| *n > 0.0)
            .ok_or_else(|| {
                NistError::invalid_field(image.location().with_field(field), "expected a positive number")
            })
    };
    let (width, height) = (number(6)?, number(7)?);
    let (h_res, v_res) = (number(9)?, number(10)?);
    let (h_dpi, v_dpi) = match image.text(8) {
        Some("1") => (h_res, v_res),
        Some("2") => (units::ppcm_to_dpi(h_res), units::ppcm_to_dpi(v_res)),
        _ => {
            return Err(NistError::invalid_field(
                image.location().with_field(8),
                "scale units must be 1 (ppi) or 2 (ppcm)",
            ))
        }
    };
    Ok((units::px_to_mm(width, h_dpi), units::px_to_mm(height, v_dpi)))
}

fn index_of(annotation: &Annotation) -> Option<i64> {
    annotation.value('i').and_then(|v| v.as_f64()).map(|i| i as i64)
}

fn write_pairing(
    record: &mut Record,
    minutiae: &AnnotationList,
    name_of: impl Fn(&Annotation) -> Option<String>,
) -> Result<usize> {
    if minutiae.is_empty() {
        record.remove_field(PAIRING_FIELD)?;
        return Ok(0);
    }
    let mut rows = AnnotationList::new(AnnotationKind::Pairing);
    let mut paired = 0;
    for m in minutiae {
        let name = name_of(m);
        if name.is_some() {
            paired += 1;
        }
        rows.push(
            Annotation::new(AnnotationKind::Pairing)
                .with('i', index_of(m).unwrap_or(0))
                .with('n', name.unwrap_or_else(|| UNPAIRED.to_string())),
        );
    }
    write(record, PAIRING_FIELD, &rows)?;
    Ok(paired)
}

fn check_type(record: &Record, field: FieldNumber) -> Result<&'static AnnotationLayout> {
    let location = record.location().with_field(field);
    if record.record_type() != MINUTIAE_RECORD {
        return Err(NistError::invalid_field(
            location,
            format!("annotations live in Type-{:02} records", MINUTIAE_RECORD),
        ));
    }
    AnnotationLayout::standard(MINUTIAE_RECORD, field)
        .ok_or_else(|| NistError::invalid_field(location, "field has no annotation layout"))
}

fn read(record: &Record, field: FieldNumber, kind: AnnotationKind) -> Result<AnnotationList> {
    let layout = check_type(record, field)?;
    match record.field(field) {
        Some(value) => layout.from_field_value(value, kind, record.location().with_field(field)),
        None => Ok(AnnotationList::new(kind)),
    }
}

fn write(record: &mut Record, field: FieldNumber, list: &AnnotationList) -> Result<()> {
    let layout = check_type(record, field)?;
    let value = layout.to_field_value(list, record.location().with_field(field))?;
    record.set_field(field, value)
}

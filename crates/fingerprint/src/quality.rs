//! Local quality map (9.308, 9.309)
//!
//! 9.308 holds one subfield per grid row, one digit per cell (0 to 5, higher
//! is better). 9.309 holds the cell size in hundredths of a millimetre and
//! the row compression, `<size><US><NONE|RLE>`.
//!
//! RLE rows spell digits 0..=5 as letters A..=F and prefix a run of more
//! than one cell with its length: `3B2DA` expands to `111330`.

use crate::fields::{self, MINUTIAE_RECORD};
use crate::list::AnnotationList;
use nist_codec::{NistFile, Record};
use nist_core::{FieldNumber, FieldValue, Location, NistError, Result};
use tracing::debug;

/// Quality map rows
pub const QUALITY_MAP_FIELD: FieldNumber = 308;
/// Cell size and row compression of the quality map
pub const QUALITY_GRID_FIELD: FieldNumber = 309;
/// Column holding a minutia's local quality
pub const QUALITY_COLUMN: char = 'l';

/// Highest cell value
const MAX_QUALITY: u8 = 5;
/// Longest run an RLE count may announce
const MAX_RUN: usize = 1 << 16;

/// Row compression of 9.308.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// One digit per cell
    #[default]
    None,
    /// Run-length encoded letters
    Rle,
}

impl Compression {
    fn code(&self) -> &'static str {
        match self {
            Compression::None => "NONE",
            Compression::Rle => "RLE",
        }
    }
}

/// Grid of local quality values over the image.
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityMap {
    cell: u32,
    rows: Vec<Vec<u8>>,
}

impl QualityMap {
    /// Map with square cells of `cell` hundredths of a millimetre.
    ///
    /// # Errors
    ///
    /// `InvalidField` for a zero cell size or a value above 5.
    pub fn new(cell: u32, rows: Vec<Vec<u8>>) -> Result<Self> {
        let invalid = |detail: String| NistError::invalid_field(Location::unknown(), detail);
        if cell == 0 {
            return Err(invalid("quality cell size must be positive".to_string()));
        }
        if let Some(v) = rows.iter().flatten().find(|v| **v > MAX_QUALITY) {
            return Err(invalid(format!("quality {} is above {}", v, MAX_QUALITY)));
        }
        Ok(QualityMap { cell, rows })
    }

    /// Cell size in hundredths of a millimetre
    pub fn cell(&self) -> u32 {
        self.cell
    }

    /// Cell size in millimetres
    pub fn cell_mm(&self) -> f64 {
        self.cell as f64 / 100.0
    }

    /// Rows, top first
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Value of cell (`col`, `row`)
    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        self.rows.get(row)?.get(col).copied()
    }

    /// Quality under a point in record coordinates (mm, origin at the
    /// bottom-left of an image `height` mm tall); `None` off the map.
    pub fn at_mm(&self, x: f64, y: f64, height: f64) -> Option<u8> {
        let from_top = height - y;
        if x < 0.0 || from_top < 0.0 {
            return None;
        }
        let cell = self.cell_mm();
        self.get((x / cell) as usize, (from_top / cell) as usize)
    }
}

/// Quality map of a Type-9 record; `None` when 9.308 is absent.
///
/// # Errors
///
/// `InvalidField` when 9.309 is missing or malformed, or a row holds
/// anything but quality digits.
pub fn quality_map(record: &Record) -> Result<Option<QualityMap>> {
    let Some(value) = record.field(QUALITY_MAP_FIELD) else {
        return Ok(None);
    };
    let location = record.location().with_field(QUALITY_MAP_FIELD);
    let (cell, compression) = grid(record)?;

    let mut rows = Vec::new();
    for subfield in value.subfields().iter() {
        let text = subfield
            .text(0)
            .ok_or_else(|| NistError::invalid_field(location, "quality row is not text"))?;
        let text = match compression {
            Compression::None => text.to_string(),
            Compression::Rle => rle_decode(text).map_err(|e| e.at(location))?,
        };
        let row = text
            .bytes()
            .map(|b| match b {
                b'0'..=b'5' => Ok(b - b'0'),
                _ => Err(NistError::invalid_field(
                    location,
                    format!("'{}' is not a quality value", b as char),
                )),
            })
            .collect::<Result<Vec<u8>>>()?;
        rows.push(row);
    }
    QualityMap::new(cell, rows).map(Some).map_err(|e| e.at(location))
}

/// Write 9.308 and 9.309.
pub fn set_quality_map(record: &mut Record, map: &QualityMap, compression: Compression) -> Result<()> {
    let rows: Vec<Vec<String>> = map
        .rows()
        .iter()
        .map(|row| {
            let digits: String = row.iter().map(|v| char::from(b'0' + v)).collect();
            match compression {
                Compression::None => vec![digits],
                Compression::Rle => vec![rle_encode(&digits)],
            }
        })
        .collect();
    record.set_field(QUALITY_MAP_FIELD, FieldValue::structured(rows))?;
    record.set_field(
        QUALITY_GRID_FIELD,
        FieldValue::structured([[map.cell().to_string(), compression.code().to_string()]]),
    )
}

/// Minutiae of Type-9 `idc` with their local quality in column `l`.
///
/// Minutiae off the map get no `l` column. The image height comes from the
/// Type-13 (or Type-14) record with the same IDC.
pub fn minutiae_with_quality(file: &NistFile, idc: u32) -> Result<AnnotationList> {
    let record = file
        .get(MINUTIAE_RECORD, idc)
        .ok_or(NistError::RecordNotFound {
            location: Location::record(MINUTIAE_RECORD, idc),
        })?;
    let mut list = fields::minutiae(record)?;
    let Some(map) = quality_map(record)? else {
        return Ok(list);
    };
    let (_, height) = fields::image_size(file, idc)?;

    let mut off_map = 0;
    for m in list.iter_mut() {
        match (m.x(), m.y()) {
            (Some(x), Some(y)) => match map.at_mm(x, y, height) {
                Some(q) => m.set(QUALITY_COLUMN, i64::from(q)),
                None => off_map += 1,
            },
            _ => off_map += 1,
        }
    }
    if off_map > 0 {
        debug!(target: "nist::fingerprint", idc, off_map, "Minutiae outside the quality map");
    }
    Ok(list)
}

/// Minutiae whose local quality is at least `threshold` (`higher`) or at
/// most `threshold` (not `higher`). Minutiae off the map are left out.
pub fn minutiae_by_quality(file: &NistFile, idc: u32, threshold: u8, higher: bool) -> Result<AnnotationList> {
    let mut list = minutiae_with_quality(file, idc)?;
    list.retain(|m| match m.get(QUALITY_COLUMN).and_then(|v| v.as_f64()) {
        Some(q) if higher => q >= f64::from(threshold),
        Some(q) => q <= f64::from(threshold),
        None => false,
    });
    Ok(list)
}

/// Expand an RLE quality row.
///
/// # Errors
///
/// `InvalidField` for a letter outside A..=F, a dangling count, a zero run
/// or a run longer than 65536 cells.
pub fn rle_decode(row: &str) -> Result<String> {
    let invalid = |detail: String| NistError::invalid_field(Location::unknown(), detail);
    let mut out = String::with_capacity(row.len());
    let mut count: Option<usize> = None;
    for c in row.chars() {
        match c {
            '0'..='9' => {
                let digit = c as usize - '0' as usize;
                let n = count.unwrap_or(0) * 10 + digit;
                if n > MAX_RUN {
                    return Err(invalid(format!("run of {} cells in '{}' is too long", n, row)));
                }
                count = Some(n);
            }
            'A'..='F' => {
                let n = count.take().unwrap_or(1);
                if n == 0 {
                    return Err(invalid(format!("zero-length run in '{}'", row)));
                }
                let digit = char::from(b'0' + (c as u8 - b'A'));
                out.extend(std::iter::repeat(digit).take(n));
            }
            other => return Err(invalid(format!("'{}' in RLE row '{}'", other, row))),
        }
    }
    if count.is_some() {
        return Err(invalid(format!("RLE row '{}' ends with a count", row)));
    }
    Ok(out)
}

/// Run-length encode a row of quality digits.
pub fn rle_encode(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len());
    let mut chars = digits.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        if run > 1 {
            out.push_str(&run.to_string());
        }
        out.push(match c {
            '0'..='5' => char::from(b'A' + (c as u8 - b'0')),
            other => other,
        });
    }
    out
}

fn grid(record: &Record) -> Result<(u32, Compression)> {
    let location = record.location().with_field(QUALITY_GRID_FIELD);
    let value = record
        .field(QUALITY_GRID_FIELD)
        .ok_or_else(|| NistError::invalid_field(location, "quality map without a grid description"))?;
    let subfields = value.subfields();
    let first = subfields
        .first()
        .ok_or_else(|| NistError::invalid_field(location, "empty grid description"))?;
    let cell = first
        .text(0)
        .and_then(|t| t.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| NistError::invalid_field(location, "cell size must be a positive number"))?;
    let compression = match first.text(1) {
        None | Some("") | Some("NONE") => Compression::None,
        Some("RLE") => Compression::Rle,
        Some(other) => {
            return Err(NistError::invalid_field(
                location,
                format!("unknown quality map compression '{}'", other),
            ))
        }
    };
    Ok((cell, compression))
}

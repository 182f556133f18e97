//! Field layouts for annotation lists
//!
//! A layout says how one annotation becomes one subfield: an ordered list of
//! items, each the concatenation of one or more columns. Fixed-width numeric
//! columns are written as zero-padded integers of `round(value * scale)`; a
//! free column is written as is and must be the last column of its item.
//!
//! Standard layouts:
//!
//! | Field | Items |
//! |-------|-------|
//! | 9.012 minutiae | `[i] [x:4*100 y:4*100 t:3] [q] [d]` |
//! | 9.008 cores | `[x:4*100 y:4*100]` |
//! | 9.009 deltas | `[x:4*100 y:4*100]` |
//! | 9.255 pairing | `[i] [n]` |

use crate::annotation::{Annotation, AnnotationKind, ColumnValue};
use crate::list::AnnotationList;
use nist_core::{FieldNumber, FieldValue, Item, Location, NistError, RecordType, Result, Subfield};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Value type a column decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Whole number
    Int,
    /// Real number
    Float,
    /// Free text
    Text,
}

/// Wire format of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFormat {
    /// Column code
    pub column: char,
    /// Digit count; `None` for a free column
    pub width: Option<usize>,
    /// Multiplier applied before rounding (fixed columns only)
    pub scale: f64,
    /// Decoded type
    pub ty: ColumnType,
}

impl ColumnFormat {
    /// Zero-padded column of `width` digits holding `round(value * scale)`
    pub fn fixed(column: char, width: usize, scale: f64, ty: ColumnType) -> Self {
        ColumnFormat {
            column,
            width: Some(width),
            scale,
            ty,
        }
    }

    /// Column written as is
    pub fn free(column: char, ty: ColumnType) -> Self {
        ColumnFormat {
            column,
            width: None,
            scale: 1.0,
            ty,
        }
    }

    fn render(&self, value: &ColumnValue, location: Location) -> Result<String> {
        let Some(width) = self.width else {
            return Ok(value.to_string());
        };
        let number = value.as_f64().ok_or_else(|| {
            NistError::encoding(
                location,
                format!("column '{}' needs a number, got '{}'", self.column, value),
            )
        })?;
        let scaled = (number * self.scale).round();
        if !scaled.is_finite() || scaled < 0.0 {
            return Err(NistError::encoding(
                location,
                format!("column '{}' cannot hold {}", self.column, number),
            ));
        }
        let digits = format!("{:0width$}", scaled as u64, width = width);
        if digits.len() > width {
            return Err(NistError::encoding(
                location,
                format!(
                    "column '{}' value {} needs {} digits, layout allows {}",
                    self.column,
                    number,
                    digits.len(),
                    width
                ),
            ));
        }
        Ok(digits)
    }

    fn parse(&self, text: &str, location: Location) -> Result<ColumnValue> {
        let bad = || {
            NistError::invalid_field(
                location,
                format!("column '{}' holds '{}'", self.column, text),
            )
        };
        if self.width.is_some() {
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            let raw: u64 = text.parse().map_err(|_| bad())?;
            return Ok(match self.ty {
                ColumnType::Int if self.scale == 1.0 => ColumnValue::Int(raw as i64),
                ColumnType::Text => ColumnValue::Text(text.to_string()),
                _ => ColumnValue::Float(raw as f64 / self.scale),
            });
        }
        match self.ty {
            ColumnType::Text => Ok(ColumnValue::Text(text.to_string())),
            ColumnType::Int => text.trim().parse().map(ColumnValue::Int).map_err(|_| bad()),
            ColumnType::Float => text.trim().parse().map(ColumnValue::Float).map_err(|_| bad()),
        }
    }
}

/// Columns concatenated into one item.
pub type ItemLayout = Vec<ColumnFormat>;

/// How an annotation list maps onto a field.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLayout {
    items: Vec<ItemLayout>,
}

static STANDARD_LAYOUTS: Lazy<HashMap<(RecordType, FieldNumber), AnnotationLayout>> =
    Lazy::new(|| {
        let mut table = HashMap::new();
        table.insert((9, 12), AnnotationLayout::minutiae());
        table.insert((9, 8), AnnotationLayout::points());
        table.insert((9, 9), AnnotationLayout::points());
        table.insert((9, 255), AnnotationLayout::pairing());
        table
    });

impl AnnotationLayout {
    /// Layout from item layouts.
    ///
    /// # Errors
    ///
    /// `InvalidField` if an item is empty or has a free column before its end.
    pub fn new(items: Vec<ItemLayout>) -> Result<Self> {
        for (n, item) in items.iter().enumerate() {
            let invalid = |detail: String| NistError::invalid_field(Location::unknown(), detail);
            if item.is_empty() {
                return Err(invalid(format!("item {} has no column", n)));
            }
            if item[..item.len() - 1].iter().any(|c| c.width.is_none()) {
                return Err(invalid(format!(
                    "item {}: only the last column may be free",
                    n
                )));
            }
        }
        Ok(AnnotationLayout { items })
    }

    /// 9.012: `[i] [x:4*100 y:4*100 t:3] [q] [d]`
    pub fn minutiae() -> Self {
        AnnotationLayout {
            items: vec![
                vec![ColumnFormat::free('i', ColumnType::Int)],
                vec![
                    ColumnFormat::fixed('x', 4, 100.0, ColumnType::Float),
                    ColumnFormat::fixed('y', 4, 100.0, ColumnType::Float),
                    ColumnFormat::fixed('t', 3, 1.0, ColumnType::Int),
                ],
                vec![ColumnFormat::free('q', ColumnType::Int)],
                vec![ColumnFormat::free('d', ColumnType::Text)],
            ],
        }
    }

    /// 9.008 and 9.009: `[x:4*100 y:4*100]`
    pub fn points() -> Self {
        AnnotationLayout {
            items: vec![vec![
                ColumnFormat::fixed('x', 4, 100.0, ColumnType::Float),
                ColumnFormat::fixed('y', 4, 100.0, ColumnType::Float),
            ]],
        }
    }

    /// 9.255: `[i] [n]`, minutia index and pairing name
    pub fn pairing() -> Self {
        AnnotationLayout {
            items: vec![
                vec![ColumnFormat::free('i', ColumnType::Int)],
                vec![ColumnFormat::free('n', ColumnType::Text)],
            ],
        }
    }

    /// Standard layout of `record_type.field`, if it carries annotations
    pub fn standard(record_type: RecordType, field: FieldNumber) -> Option<&'static AnnotationLayout> {
        STANDARD_LAYOUTS.get(&(record_type, field))
    }

    /// Item layouts in order
    pub fn items(&self) -> &[ItemLayout] {
        &self.items
    }

    /// Column codes in wire order
    pub fn columns(&self) -> impl Iterator<Item = char> + '_ {
        self.items.iter().flatten().map(|c| c.column)
    }

    /// One subfield per annotation, its trailing items after the layout items.
    ///
    /// # Errors
    ///
    /// - `MissingColumn` when an annotation lacks a column without default
    /// - `Encoding` for numbers that do not fit their width, negative
    ///   numbers, or separator bytes in text
    pub fn to_field_value(&self, list: &AnnotationList, location: Location) -> Result<FieldValue> {
        let mut subfields = Vec::with_capacity(list.len());
        for annotation in list {
            let mut items = Vec::with_capacity(self.items.len());
            for item_layout in &self.items {
                let mut text = String::new();
                for format in item_layout {
                    let value = annotation.value(format.column).ok_or(NistError::MissingColumn {
                        location,
                        column: format.column,
                    })?;
                    text.push_str(&format.render(&value, location)?);
                }
                items.push(Item::from(text));
            }
            items.extend(annotation.trailing_items().iter().cloned());
            subfields.push(Subfield::new(items));
        }
        let value = FieldValue::Structured(subfields).canonical();
        value.validate_leaves(location)?;
        Ok(value)
    }

    /// Parse a field written with this layout.
    ///
    /// An empty value is an empty list. Items beyond the layout are kept on
    /// each annotation as trailing items.
    ///
    /// # Errors
    ///
    /// `FormatMismatch` for a subfield with fewer items than the layout;
    /// `InvalidField` for an item that does not match its columns.
    pub fn from_field_value(
        &self,
        value: &FieldValue,
        kind: AnnotationKind,
        location: Location,
    ) -> Result<AnnotationList> {
        let mut list = AnnotationList::new(kind);
        if value.as_str() == Some("") {
            return Ok(list);
        }
        let subfields = value.subfields();
        for (row, subfield) in subfields.iter().enumerate() {
            if subfield.len() < self.items.len() {
                return Err(NistError::FormatMismatch {
                    location,
                    row,
                    expected: self.items.len(),
                    actual: subfield.len(),
                });
            }

            let mut annotation = Annotation::new(kind);
            for (item_layout, item) in self.items.iter().zip(subfield.iter()) {
                let text = item.as_str().ok_or_else(|| {
                    NistError::invalid_field(location, format!("row {} is not text", row))
                })?;
                self.parse_item(item_layout, text, &mut annotation, location)?;
            }
            let extra = &subfield.items()[self.items.len()..];
            if !extra.is_empty() {
                annotation.set_trailing_items(extra.to_vec());
            }
            list.push(annotation);
        }
        Ok(list)
    }

    fn parse_item(
        &self,
        item_layout: &[ColumnFormat],
        text: &str,
        annotation: &mut Annotation,
        location: Location,
    ) -> Result<()> {
        let fixed: usize = item_layout.iter().filter_map(|c| c.width).sum();
        let has_free = item_layout.iter().any(|c| c.width.is_none());
        if text.len() < fixed || (!has_free && text.len() != fixed) {
            return Err(NistError::invalid_field(
                location,
                format!("item '{}' does not match a {}-digit layout", text, fixed),
            ));
        }

        let mut rest = text;
        for format in item_layout {
            let piece = match format.width {
                Some(width) if rest.is_char_boundary(width) => {
                    let (piece, tail) = rest.split_at(width);
                    rest = tail;
                    piece
                }
                Some(_) => {
                    return Err(NistError::invalid_field(
                        location,
                        format!("item '{}' is not ASCII", text),
                    ))
                }
                None => std::mem::take(&mut rest),
            };
            annotation.set(format.column, format.parse(piece, location)?);
        }
        Ok(())
    }
}

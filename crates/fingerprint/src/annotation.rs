//! Annotations: named-column feature rows
//!
//! An [`Annotation`] is one minutia, core or delta. Its columns are keyed by
//! single-character codes:
//!
//! | Code | Column |
//! |------|--------|
//! | `i`  | index |
//! | `x`  | X coordinate (mm) |
//! | `y`  | Y coordinate (mm) |
//! | `t`  | angle theta (degrees) |
//! | `q`  | quality |
//! | `d`  | type designator |
//!
//! Other codes are carried as extension columns. Wire items past the end of
//! a field layout are kept verbatim as trailing items, so a row read from a
//! richer producer is written back whole.

use nist_core::{Item, Location, NistError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Value of one annotation column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// Integer column (index, angle, quality)
    Int(i64),
    /// Real column (coordinates)
    Float(f64),
    /// Text column (type designator)
    Text(String),
}

impl ColumnValue {
    /// Numeric view; text is parsed when it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int(n) => Some(*n as f64),
            ColumnValue::Float(f) => Some(*f),
            ColumnValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text view, `None` for numbers
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int(n) => write!(f, "{}", n),
            ColumnValue::Float(x) => write!(f, "{}", x),
            ColumnValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(n: i64) -> Self {
        ColumnValue::Int(n)
    }
}

impl From<i32> for ColumnValue {
    fn from(n: i32) -> Self {
        ColumnValue::Int(n as i64)
    }
}

impl From<f64> for ColumnValue {
    fn from(x: f64) -> Self {
        ColumnValue::Float(x)
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        ColumnValue::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        ColumnValue::Text(s)
    }
}

/// Ordered column codes, e.g. `"ixytqd"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatSpec {
    columns: Vec<char>,
}

impl FormatSpec {
    /// Parse a column code string.
    ///
    /// # Errors
    ///
    /// `InvalidField` if the string is empty, holds a non-alphabetic code,
    /// or repeats a code.
    pub fn parse(codes: &str) -> Result<FormatSpec> {
        let invalid = |detail: String| NistError::invalid_field(Location::unknown(), detail);
        if codes.is_empty() {
            return Err(invalid("empty format spec".to_string()));
        }
        let mut columns = Vec::with_capacity(codes.len());
        for c in codes.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(invalid(format!("'{}' is not a column code", c)));
            }
            if columns.contains(&c) {
                return Err(invalid(format!("column '{}' appears twice in \"{}\"", c, codes)));
            }
            columns.push(c);
        }
        Ok(FormatSpec { columns })
    }

    /// Column codes in order
    pub fn columns(&self) -> &[char] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a parsed spec
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Does the format name `column`?
    pub fn contains(&self, column: char) -> bool {
        self.columns.contains(&column)
    }
}

impl FromStr for FormatSpec {
    type Err = NistError;

    fn from_str(s: &str) -> Result<Self> {
        FormatSpec::parse(s)
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.columns {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// What an annotation describes; decides the column defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnnotationKind {
    /// Untyped row, no defaults
    #[default]
    Generic,
    /// Minutia (9.012)
    Minutia,
    /// Core (9.008)
    Core,
    /// Delta (9.009)
    Delta,
    /// Minutia pairing row (9.255): minutia index and pairing name
    Pairing,
}

impl AnnotationKind {
    /// Column codes the kind is usually written with
    pub fn default_spec(&self) -> &'static str {
        match self {
            AnnotationKind::Generic => "i",
            AnnotationKind::Minutia => "ixytqd",
            AnnotationKind::Core | AnnotationKind::Delta => "xy",
            AnnotationKind::Pairing => "in",
        }
    }

    /// Value of `column` when an annotation does not carry it
    pub fn default_value(&self, column: char) -> Option<ColumnValue> {
        match (self, column) {
            (AnnotationKind::Minutia, 'i' | 'x' | 'y' | 't' | 'q') => Some(ColumnValue::Int(0)),
            (AnnotationKind::Minutia, 'd') => Some(ColumnValue::Text("A".to_string())),
            _ => None,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Generic => "Annotation",
            AnnotationKind::Minutia => "Minutia",
            AnnotationKind::Core => "Core",
            AnnotationKind::Delta => "Delta",
            AnnotationKind::Pairing => "Pairing",
        }
    }
}

/// One feature row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    kind: AnnotationKind,
    values: BTreeMap<char, ColumnValue>,
    trailing: Vec<Item>,
}

impl Annotation {
    /// Annotation without any column
    pub fn new(kind: AnnotationKind) -> Self {
        Annotation {
            kind,
            values: BTreeMap::new(),
            trailing: Vec::new(),
        }
    }

    /// Set a column (builder pattern).
    pub fn with(mut self, column: char, value: impl Into<ColumnValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Kind of this annotation
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Stored value of `column`
    pub fn get(&self, column: char) -> Option<&ColumnValue> {
        self.values.get(&column)
    }

    /// Stored value of `column`, or the kind's default.
    pub fn value(&self, column: char) -> Option<ColumnValue> {
        self.values
            .get(&column)
            .cloned()
            .or_else(|| self.kind.default_value(column))
    }

    /// Set a column
    pub fn set(&mut self, column: char, value: impl Into<ColumnValue>) {
        self.values.insert(column, value.into());
    }

    /// Drop a stored column; the kind's default shows through again.
    pub fn unset(&mut self, column: char) -> Option<ColumnValue> {
        self.values.remove(&column)
    }

    /// Pairing name (`n` column), if the annotation is paired
    pub fn pairing_name(&self) -> Option<String> {
        self.get('n').map(|v| v.to_string())
    }

    /// Wire items read past the end of the field layout
    pub fn trailing_items(&self) -> &[Item] {
        &self.trailing
    }

    /// Replace the trailing items; they are written after the layout items.
    pub fn set_trailing_items(&mut self, items: Vec<Item>) {
        self.trailing = items;
    }

    /// Columns actually stored, in code order
    pub fn columns(&self) -> impl Iterator<Item = char> + '_ {
        self.values.keys().copied()
    }

    /// X coordinate
    pub fn x(&self) -> Option<f64> {
        self.value('x').and_then(|v| v.as_f64())
    }

    /// Y coordinate
    pub fn y(&self) -> Option<f64> {
        self.value('y').and_then(|v| v.as_f64())
    }

    /// Type designator (`d` column)
    pub fn designator(&self) -> Option<String> {
        self.value('d').map(|v| v.to_string())
    }

    /// Euclidean distance to `point`; `None` without coordinates.
    pub fn distance_to(&self, point: (f64, f64)) -> Option<f64> {
        let (x, y) = (self.x()?, self.y()?);
        Some(((x - point.0).powi(2) + (y - point.1).powi(2)).sqrt())
    }

    /// Shift the coordinates; other columns are untouched.
    pub fn offset(&mut self, dx: f64, dy: f64) {
        if let Some(x) = self.x() {
            self.set('x', x + dx);
        }
        if let Some(y) = self.y() {
            self.set('y', y + dy);
        }
    }

    /// Project onto `spec`.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when a column is neither stored nor defaulted.
    pub fn project(&self, spec: &FormatSpec) -> Result<Vec<ColumnValue>> {
        spec.columns()
            .iter()
            .map(|&column| {
                self.value(column).ok_or(NistError::MissingColumn {
                    location: Location::unknown(),
                    column,
                })
            })
            .collect()
    }

    /// JSON object of the stored columns
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (column, value) in &self.values {
            let json = serde_json::to_value(value).unwrap_or(Value::Null);
            map.insert(column.to_string(), json);
        }
        Value::Object(map)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.name())?;
        for (n, (column, value)) in self.values.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}='{}'", column, value)?;
        }
        f.write_str(")")
    }
}

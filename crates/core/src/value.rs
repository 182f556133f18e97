//! Field value model
//!
//! This module defines:
//! - Item: a leaf of bytes
//! - Subfield: an ordered list of items (joined by US on the wire)
//! - Blob: raw binary payload (image data), exempt from separator rules
//! - FieldValue: the tagged union stored in every record field
//!
//! ## Canonical Form
//!
//! A `Structured` value holding at most one subfield of at most one item is
//! indistinguishable on the wire from a `Scalar`. Constructors and the
//! decoder therefore always produce the `Scalar` form for it, so that a
//! value survives an encode/decode cycle unchanged. An empty subfield is
//! normalised to a subfield of one empty item for the same reason.

use crate::error::{NistError, Result};
use crate::types::{is_separator, separator_name, Location};
use std::borrow::Cow;
use std::fmt;

/// Leaf bytes of a field value.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item(Vec<u8>);

impl Item {
    /// Wrap raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Content as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Take the bytes out
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the leaf empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First reserved separator byte and its position, if any
    pub fn find_separator(&self) -> Option<(usize, u8)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, b)| is_separator(**b))
            .map(|(pos, b)| (pos, *b))
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item(s.as_bytes().to_vec())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item(s.into_bytes())
    }
}

impl From<&String> for Item {
    fn from(s: &String) -> Self {
        Item(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item(bytes)
    }
}

impl From<&[u8]> for Item {
    fn from(bytes: &[u8]) -> Self {
        Item(bytes.to_vec())
    }
}

/// Ordered items of one subfield.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Subfield(Vec<Item>);

impl Subfield {
    /// Build from items
    pub fn new(items: Vec<Item>) -> Self {
        Self(items)
    }

    /// Items in order
    pub fn items(&self) -> &[Item] {
        &self.0
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    /// Item at `index` as text
    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Item::as_str)
    }

    /// Append an item
    pub fn push(&mut self, item: impl Into<Item>) {
        self.0.push(item.into());
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No items?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over items
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    /// Take the items out
    pub fn into_items(self) -> Vec<Item> {
        self.0
    }
}

impl<T: Into<Item>> FromIterator<T> for Subfield {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Subfield(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Item>> for Subfield {
    fn from(items: Vec<Item>) -> Self {
        Subfield(items)
    }
}

/// Raw binary payload.
///
/// `Debug` prints a short hex excerpt instead of the whole payload; images
/// run to hundreds of kilobytes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(Vec<u8>);

impl Blob {
    /// Wrap bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the bytes out
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Empty payload?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const BLOB_EXCERPT: usize = 4;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 2 * BLOB_EXCERPT {
            write!(f, "Blob({} ({} bytes))", hex(&self.0), self.0.len())
        } else {
            write!(
                f,
                "Blob({} ... {} ({} bytes))",
                hex(&self.0[..BLOB_EXCERPT]),
                hex(&self.0[self.0.len() - BLOB_EXCERPT..]),
                self.0.len()
            )
        }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Blob(bytes.to_vec())
    }
}

/// Value of one record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Single leaf
    Scalar(Item),
    /// Subfields of items
    Structured(Vec<Subfield>),
    /// Raw binary payload
    Blob(Blob),
}

impl FieldValue {
    /// Single text/byte value
    pub fn scalar(item: impl Into<Item>) -> Self {
        FieldValue::Scalar(item.into())
    }

    /// Binary payload
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        FieldValue::Blob(Blob::new(bytes))
    }

    /// Structured value from rows of leaves, canonicalized.
    ///
    /// ```
    /// use nist_core::FieldValue;
    /// let v = FieldValue::structured([["1", "3"], ["2", "0"]]);
    /// assert_eq!(v.subfields().len(), 2);
    /// ```
    pub fn structured<R, S, T>(rows: R) -> Self
    where
        R: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        FieldValue::Structured(
            rows.into_iter()
                .map(|row| row.into_iter().collect::<Subfield>())
                .collect(),
        )
        .canonical()
    }

    /// Bring the value into canonical form (see module docs).
    pub fn canonical(self) -> Self {
        match self {
            FieldValue::Structured(subfields) => {
                let mut subfields: Vec<Subfield> = subfields
                    .into_iter()
                    .map(|s| {
                        if s.is_empty() {
                            Subfield(vec![Item::default()])
                        } else {
                            s
                        }
                    })
                    .collect();
                match subfields.len() {
                    0 => FieldValue::Scalar(Item::default()),
                    1 if subfields[0].len() == 1 => {
                        let item = subfields.remove(0).0.remove(0);
                        FieldValue::Scalar(item)
                    }
                    _ => FieldValue::Structured(subfields),
                }
            }
            other => other,
        }
    }

    /// Is this value already canonical?
    pub fn is_canonical(&self) -> bool {
        match self {
            FieldValue::Structured(subfields) => {
                !(subfields.len() <= 1 && subfields.iter().all(|s| s.len() <= 1))
                    && subfields.iter().all(|s| !s.is_empty())
            }
            _ => true,
        }
    }

    /// The leaf of a scalar value
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            FieldValue::Scalar(item) => Some(item),
            _ => None,
        }
    }

    /// Scalar content as text
    pub fn as_str(&self) -> Option<&str> {
        self.as_item().and_then(Item::as_str)
    }

    /// Blob payload
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            FieldValue::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Bytes of a scalar or blob value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Scalar(item) => Some(item.as_bytes()),
            FieldValue::Blob(blob) => Some(blob.as_bytes()),
            FieldValue::Structured(_) => None,
        }
    }

    /// Subfield view of any value.
    ///
    /// A scalar reads as one subfield of one item; this is how a field
    /// holding a single core or a single manifest entry is read back.
    pub fn subfields(&self) -> Cow<'_, [Subfield]> {
        match self {
            FieldValue::Structured(subfields) => Cow::Borrowed(subfields.as_slice()),
            FieldValue::Scalar(item) => Cow::Owned(vec![Subfield(vec![item.clone()])]),
            FieldValue::Blob(blob) => Cow::Owned(vec![Subfield(vec![Item::new(blob.as_bytes())])]),
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            FieldValue::Structured(subfields) => subfields.iter().map(Subfield::len).sum(),
            _ => 1,
        }
    }

    /// Variant name for messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Structured(_) => "structured",
            FieldValue::Blob(_) => "blob",
        }
    }

    /// Reject reserved separator bytes inside scalar or item leaves.
    ///
    /// Blob payloads are exempt.
    pub fn validate_leaves(&self, location: Location) -> Result<()> {
        let reject = |pos: usize, byte: u8, place: String| {
            NistError::encoding(
                location,
                format!(
                    "reserved {} (0x{:02X}) byte at position {} of {}",
                    separator_name(byte).unwrap_or("separator"),
                    byte,
                    pos,
                    place
                ),
            )
        };
        match self {
            FieldValue::Scalar(item) => match item.find_separator() {
                Some((pos, byte)) => Err(reject(pos, byte, "the value".to_string())),
                None => Ok(()),
            },
            FieldValue::Structured(subfields) => {
                for (s, subfield) in subfields.iter().enumerate() {
                    for (i, item) in subfield.iter().enumerate() {
                        if let Some((pos, byte)) = item.find_separator() {
                            return Err(reject(pos, byte, format!("item {} of subfield {}", i, s)));
                        }
                    }
                }
                Ok(())
            }
            FieldValue::Blob(_) => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::scalar(s)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::scalar(s)
    }
}

impl From<Blob> for FieldValue {
    fn from(blob: Blob) -> Self {
        FieldValue::Blob(blob)
    }
}

//! Manifest protocol
//!
//! Field 1.003 lists every other record of the file:
//!
//! ```text
//! 1<US>N <RS> type<US>idc <RS> type<US>idc ...
//! ```
//!
//! `N` is the number of entries. The file regenerates the field on every add
//! and remove; on parse, records must follow the manifest one for one.

use nist_core::{FieldValue, Location, NistError, RecordKey, Result, Subfield, MANIFEST_FIELD};
use std::collections::BTreeSet;

/// Parsed or generated content of field 1.003.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: Vec<RecordKey>,
}

impl Manifest {
    /// Manifest listing `keys` in the given order; Type-1 keys are skipped.
    pub fn from_keys<I: IntoIterator<Item = RecordKey>>(keys: I) -> Self {
        Manifest {
            entries: keys.into_iter().filter(|k| !k.is_header()).collect(),
        }
    }

    /// Entries in manifest order
    pub fn entries(&self) -> &[RecordKey] {
        &self.entries
    }

    /// Number of entries (the `N` of the first subfield)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No records besides Type-1?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Are entries in serialization order (ascending type, then IDC)?
    pub fn is_canonical(&self) -> bool {
        self.entries.windows(2).all(|w| w[0] < w[1])
    }

    /// Field value for 1.003
    pub fn to_field_value(&self) -> FieldValue {
        let mut subfields = Vec::with_capacity(self.entries.len() + 1);
        subfields.push(Subfield::from_iter(["1".to_string(), self.entries.len().to_string()]));
        for key in &self.entries {
            subfields.push(Subfield::from_iter([
                key.record_type.to_string(),
                key.idc.to_string(),
            ]));
        }
        FieldValue::Structured(subfields)
    }

    /// Parse the value of field 1.003.
    ///
    /// # Errors
    ///
    /// `ManifestMismatch` if the count disagrees with the entries, an entry
    /// is malformed, lists Type-1, or appears twice.
    pub fn decode(value: &FieldValue) -> Result<Manifest> {
        let location = Location::record(1, 0).with_field(MANIFEST_FIELD);
        let mismatch = |detail: String| NistError::manifest(location, detail);

        let subfields = value.subfields();
        let Some((head, rows)) = subfields.split_first() else {
            return Err(mismatch("empty manifest".to_string()));
        };
        if head.len() != 2 || head.text(0) != Some("1") {
            return Err(mismatch("first subfield must be '1<US>count'".to_string()));
        }
        let count = head
            .text(1)
            .and_then(parse_number::<usize>)
            .ok_or_else(|| mismatch("record count is not a decimal number".to_string()))?;
        if count != rows.len() {
            return Err(mismatch(format!(
                "manifest declares {} records but lists {}",
                count,
                rows.len()
            )));
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let record_type = row.text(0).and_then(parse_number::<u8>);
            let idc = row.text(1).and_then(parse_number::<u32>);
            let key = match (row.len(), record_type, idc) {
                (2, Some(rt), Some(idc)) => RecordKey::new(rt, idc),
                _ => return Err(mismatch(format!("entry {} is not 'type<US>idc'", i + 1))),
            };
            if key.is_header() || key.record_type == 0 {
                return Err(mismatch(format!("entry {} lists Type-{:02}", i + 1, key.record_type)));
            }
            if !seen.insert(key) {
                return Err(mismatch(format!("{} listed twice", key)));
            }
            entries.push(key);
        }
        Ok(Manifest { entries })
    }
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

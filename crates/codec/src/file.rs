//! Record store
//!
//! A [`NistFile`] owns the Type-1 header and every other record, keyed by
//! (type, IDC). Whatever sequence of operations is applied, the header's
//! manifest (1.003) lists exactly the stored records in serialization order:
//! every operation that changes the set of keys regenerates it before
//! returning.

use crate::codec::Codec;
use crate::manifest::Manifest;
use crate::record::Record;
use nist_core::{
    header_schema, record_schema, FieldNumber, FieldValue, Location, NistError, RecordKey, RecordType, Result,
    MANIFEST_FIELD,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Version written to 1.002 by [`NistFile::new`]
pub const DEFAULT_VERSION: &str = "0502";

/// What [`NistFile::merge`] does when both files hold the same (type, IDC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Abort the merge with `DuplicateRecord`
    #[default]
    Fail,
    /// Overwrite the existing record's fields with the incoming ones
    Update,
    /// Keep the existing record untouched
    Ignore,
}

/// An in-memory NIST transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NistFile {
    header: Record,
    records: BTreeMap<RecordKey, Record>,
}

impl Default for NistFile {
    fn default() -> Self {
        Self::new()
    }
}

impl NistFile {
    /// File holding only a Type-1 header (version 0502, empty manifest).
    pub fn new() -> Self {
        let mut file = NistFile {
            header: Self::empty_header(),
            records: BTreeMap::new(),
        };
        file.header.insert_raw(2, FieldValue::scalar(DEFAULT_VERSION));
        file.refresh_manifest();
        file
    }

    fn empty_header() -> Record {
        Record::new(header_schema(), 0)
    }

    /// Build a file from parsed records.
    ///
    /// The caller has already checked the records against the manifest, so
    /// keys are unique; the manifest is regenerated only when the physical
    /// order was not the serialization order.
    pub(crate) fn from_parsed(header: Record, records: Vec<Record>) -> Self {
        let mut file = NistFile {
            header,
            records: BTreeMap::new(),
        };
        for record in records {
            file.records.insert(record.key(), record);
        }
        file
    }

    /// Parse with the default options and the built-in vendor profiles.
    pub fn parse(input: &[u8]) -> Result<NistFile> {
        Codec::default().parse(input)
    }

    /// Serialize with the default options and the built-in vendor profiles.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Codec::default().serialize(self)
    }

    /// The Type-1 record
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// The Type-1 record, for setting header fields.
    ///
    /// Fields 1 and 3 stay reserved; see [`Record::set_field`].
    pub fn header_mut(&mut self) -> &mut Record {
        &mut self.header
    }

    /// Standard version in 1.002
    pub fn version(&self) -> Option<&str> {
        self.header.text(2)
    }

    /// Add a record.
    ///
    /// Field 2 is set to `idc`; `fields` may hold any other field except 1.
    /// The record is only inserted when every field was accepted.
    ///
    /// # Errors
    ///
    /// - `ReservedField` for Type-1, or for field 1/2 in `fields`
    /// - `UnsupportedRecordType` for types without a layout
    /// - `DuplicateRecord` if (type, IDC) is taken
    /// - `InvalidField` if the IDC does not fit the record layout
    /// - any error of [`Record::set_field`]
    pub fn add<I, V>(&mut self, record_type: RecordType, idc: u32, fields: I) -> Result<&mut Record>
    where
        I: IntoIterator<Item = (FieldNumber, V)>,
        V: Into<FieldValue>,
    {
        let key = RecordKey::new(record_type, idc);
        let location = key.location();
        if key.is_header() {
            return Err(NistError::ReservedField {
                location,
                detail: "the Type-1 record is created with the file".to_string(),
            });
        }
        let schema = record_schema(record_type)
            .ok_or(NistError::UnsupportedRecordType { location })?;
        if self.records.contains_key(&key) {
            return Err(NistError::DuplicateRecord { location });
        }
        if idc > schema.max_idc() {
            return Err(NistError::invalid_field(
                location.with_field(2),
                format!("IDC {} exceeds {}", idc, schema.max_idc()),
            ));
        }

        let mut record = Record::new(schema, idc);
        record.set_idc(idc);
        for (field, value) in fields {
            record.set_field(field, value)?;
        }

        debug!(target: "nist::codec", record = %key, fields = record.len(), "Added record");
        self.records.insert(key, record);
        self.refresh_manifest();
        self.records
            .get_mut(&key)
            .ok_or(NistError::RecordNotFound { location })
    }

    /// Remove a record and return it.
    ///
    /// # Errors
    ///
    /// `ReservedField` for Type-1, `RecordNotFound` for unknown keys.
    pub fn remove(&mut self, record_type: RecordType, idc: u32) -> Result<Record> {
        let key = RecordKey::new(record_type, idc);
        if key.is_header() {
            return Err(NistError::ReservedField {
                location: key.location(),
                detail: "the Type-1 record cannot be removed".to_string(),
            });
        }
        let record = self
            .records
            .remove(&key)
            .ok_or(NistError::RecordNotFound {
                location: key.location(),
            })?;
        self.refresh_manifest();
        debug!(target: "nist::codec", record = %key, "Removed record");
        Ok(record)
    }

    /// Record by key
    pub fn get(&self, record_type: RecordType, idc: u32) -> Option<&Record> {
        let key = RecordKey::new(record_type, idc);
        if key == self.header.key() {
            Some(&self.header)
        } else {
            self.records.get(&key)
        }
    }

    /// Record by key, for setting fields
    pub fn get_mut(&mut self, record_type: RecordType, idc: u32) -> Option<&mut Record> {
        let key = RecordKey::new(record_type, idc);
        if key == self.header.key() {
            Some(&mut self.header)
        } else {
            self.records.get_mut(&key)
        }
    }

    /// Is (type, IDC) present?
    pub fn contains(&self, record_type: RecordType, idc: u32) -> bool {
        self.get(record_type, idc).is_some()
    }

    /// The only record of `record_type`.
    ///
    /// # Errors
    ///
    /// `RecordNotFound` if there is none, `NeedIdc` if there are several.
    pub fn get_single(&self, record_type: RecordType) -> Result<&Record> {
        let key = self.single_key(record_type)?;
        self.get(key.record_type, key.idc)
            .ok_or(NistError::RecordNotFound {
                location: key.location(),
            })
    }

    /// Mutable variant of [`NistFile::get_single`]
    pub fn get_single_mut(&mut self, record_type: RecordType) -> Result<&mut Record> {
        let key = self.single_key(record_type)?;
        self.get_mut(key.record_type, key.idc)
            .ok_or(NistError::RecordNotFound {
                location: key.location(),
            })
    }

    fn single_key(&self, record_type: RecordType) -> Result<RecordKey> {
        let idcs = self.idcs(record_type);
        match idcs.as_slice() {
            [idc] => Ok(RecordKey::new(record_type, *idc)),
            [] => Err(NistError::RecordNotFound {
                location: Location::record_type(record_type),
            }),
            several => Err(NistError::NeedIdc {
                location: Location::record_type(record_type),
                count: several.len(),
            }),
        }
    }

    /// All records in serialization order, Type-1 first
    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        std::iter::once(&self.header).chain(self.records.values())
    }

    /// All keys in serialization order, Type-1 first
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.records().map(Record::key)
    }

    /// Number of records, Type-1 included
    pub fn len(&self) -> usize {
        self.records.len() + 1
    }

    /// True when the file holds nothing but its Type-1 header
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct record types present, ascending
    pub fn record_types(&self) -> Vec<RecordType> {
        let mut types: Vec<RecordType> = self.keys().map(|k| k.record_type).collect();
        types.dedup();
        types
    }

    /// IDCs present for `record_type`, ascending
    pub fn idcs(&self, record_type: RecordType) -> Vec<u32> {
        self.keys()
            .filter(|k| k.record_type == record_type)
            .map(|k| k.idc)
            .collect()
    }

    /// Manifest describing the current records
    pub fn manifest(&self) -> Manifest {
        Manifest::from_keys(self.records.keys().copied())
    }

    /// Change the IDC of a record (key and field 2).
    ///
    /// # Errors
    ///
    /// `ReservedField` for Type-1, `RecordNotFound` if `from` is absent,
    /// `DuplicateRecord` if `to` is taken, `InvalidField` if `to` does not fit
    /// the record layout.
    pub fn move_idc(&mut self, record_type: RecordType, from: u32, to: u32) -> Result<()> {
        let from_key = RecordKey::new(record_type, from);
        let to_key = RecordKey::new(record_type, to);
        if from_key.is_header() {
            return Err(NistError::ReservedField {
                location: from_key.location(),
                detail: "the Type-1 IDC is always 0".to_string(),
            });
        }
        if from == to {
            return match self.records.contains_key(&from_key) {
                true => Ok(()),
                false => Err(NistError::RecordNotFound {
                    location: from_key.location(),
                }),
            };
        }
        if self.records.contains_key(&to_key) {
            return Err(NistError::DuplicateRecord {
                location: to_key.location(),
            });
        }
        let max_idc = self
            .records
            .get(&from_key)
            .map(|r| r.schema().max_idc())
            .ok_or(NistError::RecordNotFound {
                location: from_key.location(),
            })?;
        if to > max_idc {
            return Err(NistError::invalid_field(
                to_key.location().with_field(2),
                format!("IDC {} exceeds {}", to, max_idc),
            ));
        }

        let mut record = self
            .records
            .remove(&from_key)
            .ok_or(NistError::RecordNotFound {
                location: from_key.location(),
            })?;
        record.set_idc(to);
        self.records.insert(to_key, record);
        self.refresh_manifest();
        debug!(target: "nist::codec", from = %from_key, to = %to_key, "Moved record");
        Ok(())
    }

    /// Merge the non-Type-1 records of `other` into this file.
    ///
    /// All or nothing: on error this file is unchanged.
    pub fn merge(&mut self, other: &NistFile, policy: MergePolicy) -> Result<()> {
        let mut merged = self.records.clone();
        for incoming in other.records.values() {
            let key = incoming.key();
            match merged.get_mut(&key) {
                None => {
                    let mut record = incoming.clone();
                    record.remove_length();
                    merged.insert(key, record);
                }
                Some(existing) => match policy {
                    MergePolicy::Fail => {
                        return Err(NistError::DuplicateRecord {
                            location: key.location(),
                        })
                    }
                    MergePolicy::Ignore => {}
                    MergePolicy::Update => {
                        for (field, value) in incoming.fields().filter(|(f, _)| *f > 2) {
                            existing.insert_raw(field, value.clone());
                        }
                        existing.remove_length();
                    }
                },
            }
        }
        self.records = merged;
        self.refresh_manifest();
        debug!(target: "nist::codec", records = self.len(), ?policy, "Merged files");
        Ok(())
    }

    /// Regenerate 1.003 from the stored records.
    pub(crate) fn refresh_manifest(&mut self) {
        let value = self.manifest().to_field_value();
        if self.header.field(MANIFEST_FIELD) != Some(&value) {
            self.header.insert_raw(MANIFEST_FIELD, value);
            self.header.remove_length();
        }
    }
}

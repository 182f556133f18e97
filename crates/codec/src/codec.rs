//! File codec
//!
//! Parsing walks the input once: the Type-1 record first, then one record
//! per manifest entry, each at the offset where the previous one ended. The
//! manifest is the only source of record types; a record whose tag disagrees
//! with its entry is a manifest mismatch, not a new record.
//!
//! Both directions resolve the vendor profile before touching any byte, so
//! an unknown profile fails without partial work.

use crate::binary;
use crate::config::CodecOptions;
use crate::file::NistFile;
use crate::manifest::Manifest;
use crate::overrides::{OverrideRegistry, ResolvedProfile};
use crate::record::{tagged, Record};
use nist_core::{
    record_schema, Location, NistError, RecordEncoding, RecordKey, Result, MANIFEST_FIELD,
};
use tracing::{debug, warn};

const HEADER_TYPE: u8 = 1;

/// Parse a complete NIST transaction.
///
/// # Errors
///
/// - `InvalidConfig` / `UnsupportedVendorProfile` before any input is read
/// - `InputTooLarge` when the input exceeds `max_input_bytes`
/// - `TruncatedInput` when a record or manifest entry runs past the end
/// - `ManifestMismatch` when records and 1.003 disagree, or bytes trail the
///   last record
/// - any record-level error, located at the record it occurred in
pub fn parse(input: &[u8], options: &CodecOptions, registry: &OverrideRegistry) -> Result<NistFile> {
    let config = &options.config;
    config.validate()?;
    let profile = registry.resolve(&options.profile)?;

    if input.len() > config.max_input_bytes {
        return Err(NistError::InputTooLarge {
            size: input.len(),
            limit: config.max_input_bytes,
            location: Location::unknown(),
        });
    }
    if input.is_empty() {
        return Err(NistError::TruncatedInput {
            location: Location::record_type(HEADER_TYPE),
            offset: 0,
            needed: 1,
            available: 0,
        });
    }

    let (header, mut offset) = tagged::decode(input, 0, HEADER_TYPE, &profile, config)
        .map_err(|e| e.at(RecordKey::header().location()))?;
    let manifest_value = header.field(MANIFEST_FIELD).ok_or_else(|| {
        NistError::manifest(
            RecordKey::header().location().with_field(MANIFEST_FIELD),
            "Type-1 record has no file content field",
        )
    })?;
    let manifest = Manifest::decode(manifest_value)?;
    debug!(
        target: "nist::codec",
        records = manifest.len(),
        bytes = input.len(),
        profile = profile.name().unwrap_or("default"),
        "Parsing file"
    );

    let mut records = Vec::with_capacity(manifest.len());
    for key in manifest.entries() {
        if offset >= input.len() {
            return Err(NistError::TruncatedInput {
                location: key.location(),
                offset,
                needed: 1,
                available: 0,
            });
        }
        let (record, consumed) = decode_record(input, offset, *key, &profile, options)
            .map_err(|e| e.at(key.location()))?;
        offset += consumed;
        records.push(record);
    }

    if offset != input.len() {
        return Err(NistError::manifest(
            Location::unknown(),
            format!(
                "{} bytes after the last record listed in the manifest",
                input.len() - offset
            ),
        ));
    }

    let mut file = NistFile::from_parsed(header, records);
    if !manifest.is_canonical() {
        warn!(
            target: "nist::codec",
            records = manifest.len(),
            "Manifest not in record order, regenerating"
        );
    }
    // Also normalizes the spelling of a canonical manifest ("02" becomes "2")
    file.refresh_manifest();
    debug!(target: "nist::codec", records = file.len(), "Parsed file");
    Ok(file)
}

fn decode_record(
    input: &[u8],
    offset: usize,
    key: RecordKey,
    profile: &ResolvedProfile<'_>,
    options: &CodecOptions,
) -> Result<(Record, usize)> {
    let location = key.location();
    let schema = record_schema(key.record_type)
        .ok_or(NistError::UnsupportedRecordType { location })?;
    let (record, consumed) = match schema.encoding {
        RecordEncoding::Binary => binary::decode(input, offset, &options.config)?,
        RecordEncoding::Tagged => {
            tagged::decode(input, offset, key.record_type, profile, &options.config)?
        }
    };
    if record.key() != key {
        return Err(NistError::manifest(
            location,
            format!("manifest lists {} at offset {}, found {}", key, offset, record.key()),
        ));
    }
    Ok((record, consumed))
}

/// Serialize a file, Type-1 first, then ascending (type, IDC).
///
/// # Errors
///
/// `InvalidConfig` / `UnsupportedVendorProfile` before any output is
/// produced; otherwise the first record-level error, located at its record.
pub fn serialize(file: &NistFile, options: &CodecOptions, registry: &OverrideRegistry) -> Result<Vec<u8>> {
    options.config.validate()?;
    let profile = registry.resolve(&options.profile)?;

    let mut out = Vec::new();
    for record in file.records() {
        let bytes = encode_record(record, &profile, options)
            .map_err(|e| e.at(record.location()))?;
        out.extend_from_slice(&bytes);
    }

    debug!(
        target: "nist::codec",
        records = file.len(),
        bytes = out.len(),
        profile = profile.name().unwrap_or("default"),
        "Serialized file"
    );
    Ok(out)
}

fn encode_record(
    record: &Record,
    profile: &ResolvedProfile<'_>,
    options: &CodecOptions,
) -> Result<Vec<u8>> {
    match record.schema().encoding {
        RecordEncoding::Binary => binary::encode(record, &options.config),
        RecordEncoding::Tagged => tagged::encode(record, profile, &options.config),
    }
}

/// Registry and options bundled for repeated calls.
///
/// ```ignore
/// let codec = Codec::new(OverrideRegistry::builtin(), CodecOptions::new().with_vendor("morpho"))?;
/// let file = codec.parse(&bytes)?;
/// ```
#[derive(Debug, Clone)]
pub struct Codec<'r> {
    registry: &'r OverrideRegistry,
    options: CodecOptions,
}

impl Default for Codec<'static> {
    fn default() -> Self {
        Codec {
            registry: OverrideRegistry::builtin(),
            options: CodecOptions::default(),
        }
    }
}

impl<'r> Codec<'r> {
    /// Codec over `registry`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an invalid configuration, `UnsupportedVendorProfile`
    /// if the selected profile is not registered.
    pub fn new(registry: &'r OverrideRegistry, options: CodecOptions) -> Result<Self> {
        options.config.validate()?;
        registry.resolve(&options.profile)?;
        Ok(Codec { registry, options })
    }

    /// Options used by every call
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// See [`parse`]
    pub fn parse(&self, input: &[u8]) -> Result<NistFile> {
        parse(input, &self.options, self.registry)
    }

    /// See [`serialize`]
    pub fn serialize(&self, file: &NistFile) -> Result<Vec<u8>> {
        serialize(file, &self.options, self.registry)
    }

    /// Byte length `record` would occupy on the wire.
    pub fn record_length(&self, record: &Record) -> Result<usize> {
        let profile = self.registry.resolve(&self.options.profile)?;
        encode_record(record, &profile, &self.options).map(|bytes| bytes.len())
    }
}

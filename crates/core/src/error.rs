//! Error types for NIST interchange files
//!
//! This module defines the single error type used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//! Every variant carries a [`Location`] naming the record type, IDC and field
//! as far as they are known where the failure was detected.

use crate::types::Location;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, NistError>;

/// Error types for the NIST codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NistError {
    /// Reserved separator byte inside leaf content, or a value that cannot be
    /// represented in its wire layout
    #[error("Encoding error at {location}: {detail}")]
    Encoding {
        /// Where the value lives
        location: Location,
        /// What could not be encoded
        detail: String,
    },

    /// Annotation row arity does not match the format spec
    #[error("Format mismatch at {location}: row {row} has {actual} columns, format expects {expected}")]
    FormatMismatch {
        /// Field the rows were destined for, if known
        location: Location,
        /// Zero-based row index
        row: usize,
        /// Number of columns in the format spec
        expected: usize,
        /// Number of values in the row
        actual: usize,
    },

    /// The Type-1 manifest and the physical records disagree
    #[error("Manifest mismatch at {location}: {detail}")]
    ManifestMismatch {
        /// Offending record or the manifest field
        location: Location,
        /// Description of the divergence
        detail: String,
    },

    /// The byte stream ends inside a record or field
    #[error("Truncated input at {location}: need {needed} bytes at offset {offset}, {available} available")]
    TruncatedInput {
        /// Record being read
        location: Location,
        /// Absolute offset where the read started
        offset: usize,
        /// Bytes required from `offset`
        needed: usize,
        /// Bytes actually left from `offset`
        available: usize,
    },

    /// A declared length disagrees with the measured one
    #[error("Length mismatch at {location}: declared {declared}, measured {actual}")]
    LengthMismatch {
        /// Record (or blob field) whose length is wrong
        location: Location,
        /// Length stated by the data
        declared: usize,
        /// Length observed or computed
        actual: usize,
    },

    /// A vendor profile was requested that is not registered
    #[error("Unsupported vendor profile '{profile}'")]
    UnsupportedVendorProfile {
        /// Requested profile name
        profile: String,
        /// Always unknown at resolve time, kept for uniformity
        location: Location,
    },

    /// A field tag could not be parsed or belongs to another record
    #[error("Invalid tag at {location}: {detail}")]
    InvalidTag {
        /// Record being parsed
        location: Location,
        /// What is wrong with the tag
        detail: String,
    },

    /// A field value violates its schema (kind, numeric content, placement)
    #[error("Invalid field at {location}: {detail}")]
    InvalidField {
        /// Offending field
        location: Location,
        /// What is wrong with it
        detail: String,
    },

    /// A record length does not fit in the configured number of digits
    #[error("Length overflow at {location}: {length} does not fit in {width} digits")]
    LengthOverflow {
        /// Record being serialized
        location: Location,
        /// Computed record length
        length: usize,
        /// Configured digit width
        width: usize,
    },

    /// A record with the same (type, IDC) already exists
    #[error("Duplicate record at {location}")]
    DuplicateRecord {
        /// Key of the clashing record
        location: Location,
    },

    /// No record with the requested (type, IDC)
    #[error("Record not found at {location}")]
    RecordNotFound {
        /// Requested key
        location: Location,
    },

    /// A type holds several records and the caller gave no IDC
    #[error("IDC required at {location}: {count} records of this type")]
    NeedIdc {
        /// Requested record type
        location: Location,
        /// How many records of that type exist
        count: usize,
    },

    /// A field or record owned by the file itself was targeted
    #[error("Reserved field at {location}: {detail}")]
    ReservedField {
        /// Targeted field
        location: Location,
        /// Why it cannot be set directly
        detail: String,
    },

    /// Record type without a supported layout
    #[error("Unsupported record type at {location}")]
    UnsupportedRecordType {
        /// Record type that was requested
        location: Location,
    },

    /// An annotation lacks a column that has no default for its kind
    #[error("Missing column '{column}' at {location}")]
    MissingColumn {
        /// Field being projected, if known
        location: Location,
        /// Column code
        column: char,
    },

    /// No minutia carries the requested pairing name
    #[error("Pairing '{name}' not found at {location}")]
    PairingNotFound {
        /// Pairing field of the record searched
        location: Location,
        /// Requested pairing name
        name: String,
    },

    /// Input exceeds the configured bound
    #[error("Input too large: {size} bytes exceeds limit of {limit}")]
    InputTooLarge {
        /// Input size
        size: usize,
        /// Configured limit
        limit: usize,
        /// Always unknown, kept for uniformity
        location: Location,
    },

    /// Codec configuration rejected
    #[error("Invalid configuration: {detail}")]
    InvalidConfig {
        /// Reason from the configuration validator
        detail: String,
        /// Always unknown, kept for uniformity
        location: Location,
    },

    /// JSON interchange failure
    #[error("JSON error at {location}: {detail}")]
    Json {
        /// Record/field being converted, if known
        location: Location,
        /// Underlying message
        detail: String,
    },
}

impl NistError {
    /// Shorthand for [`NistError::Encoding`]
    pub fn encoding(location: Location, detail: impl Into<String>) -> Self {
        NistError::Encoding {
            location,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`NistError::InvalidField`]
    pub fn invalid_field(location: Location, detail: impl Into<String>) -> Self {
        NistError::InvalidField {
            location,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`NistError::ManifestMismatch`]
    pub fn manifest(location: Location, detail: impl Into<String>) -> Self {
        NistError::ManifestMismatch {
            location,
            detail: detail.into(),
        }
    }

    /// Shorthand for [`NistError::Json`]
    pub fn json(location: Location, detail: impl Into<String>) -> Self {
        NistError::Json {
            location,
            detail: detail.into(),
        }
    }

    /// Location carried by this error
    pub fn location(&self) -> &Location {
        match self {
            NistError::Encoding { location, .. }
            | NistError::FormatMismatch { location, .. }
            | NistError::ManifestMismatch { location, .. }
            | NistError::TruncatedInput { location, .. }
            | NistError::LengthMismatch { location, .. }
            | NistError::UnsupportedVendorProfile { location, .. }
            | NistError::InvalidTag { location, .. }
            | NistError::InvalidField { location, .. }
            | NistError::LengthOverflow { location, .. }
            | NistError::DuplicateRecord { location }
            | NistError::RecordNotFound { location }
            | NistError::NeedIdc { location, .. }
            | NistError::ReservedField { location, .. }
            | NistError::UnsupportedRecordType { location }
            | NistError::MissingColumn { location, .. }
            | NistError::PairingNotFound { location, .. }
            | NistError::InputTooLarge { location, .. }
            | NistError::InvalidConfig { location, .. }
            | NistError::Json { location, .. } => location,
        }
    }

    fn location_mut(&mut self) -> &mut Location {
        match self {
            NistError::Encoding { location, .. }
            | NistError::FormatMismatch { location, .. }
            | NistError::ManifestMismatch { location, .. }
            | NistError::TruncatedInput { location, .. }
            | NistError::LengthMismatch { location, .. }
            | NistError::UnsupportedVendorProfile { location, .. }
            | NistError::InvalidTag { location, .. }
            | NistError::InvalidField { location, .. }
            | NistError::LengthOverflow { location, .. }
            | NistError::DuplicateRecord { location }
            | NistError::RecordNotFound { location }
            | NistError::NeedIdc { location, .. }
            | NistError::ReservedField { location, .. }
            | NistError::UnsupportedRecordType { location }
            | NistError::MissingColumn { location, .. }
            | NistError::PairingNotFound { location, .. }
            | NistError::InputTooLarge { location, .. }
            | NistError::InvalidConfig { location, .. }
            | NistError::Json { location, .. } => location,
        }
    }

    /// Fill in the parts of the location this error does not know yet.
    ///
    /// Lower layers (annotation layouts, field codecs) raise errors without
    /// knowing which record they work on; the caller that does know adds it.
    pub fn at(mut self, outer: Location) -> Self {
        let location = self.location_mut();
        *location = location.or(outer);
        self
    }
}

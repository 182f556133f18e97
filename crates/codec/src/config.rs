//! Codec configuration.
//!
//! This module provides configuration for parse and serialize calls.

use crate::overrides::ProfileSelector;
use nist_core::{Location, NistError, RecordType};
use std::collections::BTreeMap;

/// Default digit width of a tagged record's length field.
pub const DEFAULT_LENGTH_WIDTH: usize = 8;

/// Widest length field accepted by [`CodecConfig::validate`].
pub const MAX_LENGTH_WIDTH: usize = 12;

/// Digit widths of the length field (x.001), per record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthWidths {
    default: usize,
    per_type: BTreeMap<RecordType, usize>,
}

impl Default for LengthWidths {
    fn default() -> Self {
        LengthWidths {
            default: DEFAULT_LENGTH_WIDTH,
            per_type: BTreeMap::new(),
        }
    }
}

impl LengthWidths {
    /// Same width for every tagged type
    pub fn uniform(width: usize) -> Self {
        LengthWidths {
            default: width,
            per_type: BTreeMap::new(),
        }
    }

    /// Override the width of one record type (builder pattern).
    pub fn with_width(mut self, record_type: RecordType, width: usize) -> Self {
        self.per_type.insert(record_type, width);
        self
    }

    /// Width used for `record_type`
    pub fn width_for(&self, record_type: RecordType) -> usize {
        self.per_type
            .get(&record_type)
            .copied()
            .unwrap_or(self.default)
    }

    fn all(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.default).chain(self.per_type.values().copied())
    }
}

/// Codec configuration parameters.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Length field widths (default: 8 digits for every tagged type).
    pub length_widths: LengthWidths,

    /// Largest input `parse` accepts, in bytes (default: 256MB).
    pub max_input_bytes: usize,

    /// Check raw image payloads against their declared geometry (default: true).
    ///
    /// Only uncompressed payloads are checked: the blob must hold exactly
    /// `width * height * bpp / 8` bytes.
    pub check_image_geometry: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            length_widths: LengthWidths::default(),
            max_input_bytes: 256 * 1024 * 1024, // 256MB
            check_image_geometry: true,
        }
    }
}

impl CodecConfig {
    /// Create a new codec configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set length field widths (builder pattern).
    pub fn with_length_widths(mut self, widths: LengthWidths) -> Self {
        self.length_widths = widths;
        self
    }

    /// Set input size bound (builder pattern).
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Enable or disable the image geometry check (builder pattern).
    pub fn with_image_geometry_check(mut self, enabled: bool) -> Self {
        self.check_image_geometry = enabled;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), CodecConfigError> {
        if let Some(width) = self
            .length_widths
            .all()
            .find(|w| *w == 0 || *w > MAX_LENGTH_WIDTH)
        {
            return Err(CodecConfigError::LengthWidthOutOfRange(width));
        }
        if self.max_input_bytes < 1024 {
            return Err(CodecConfigError::MaxInputTooSmall);
        }
        Ok(())
    }

    /// Create a configuration for tests (small input bound, geometry check on).
    pub fn for_testing() -> Self {
        CodecConfig {
            length_widths: LengthWidths::default(),
            max_input_bytes: 4 * 1024 * 1024, // 4MB
            check_image_geometry: true,
        }
    }
}

/// Codec configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecConfigError {
    /// A length width is zero or wider than 12 digits.
    #[error("Length field width must be between 1 and 12, got {0}")]
    LengthWidthOutOfRange(usize),

    /// Input bound is too small (minimum 1KB).
    #[error("Maximum input size must be at least 1KB")]
    MaxInputTooSmall,
}

impl From<CodecConfigError> for NistError {
    fn from(e: CodecConfigError) -> Self {
        NistError::InvalidConfig {
            detail: e.to_string(),
            location: Location::unknown(),
        }
    }
}

/// Everything one parse or serialize call needs besides the registry.
#[derive(Debug, Clone, Default)]
pub struct CodecOptions {
    /// Codec configuration
    pub config: CodecConfig,
    /// Vendor profile whose overrides apply to this call
    pub profile: ProfileSelector,
}

impl CodecOptions {
    /// Default configuration, no vendor profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration (builder pattern).
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Select a vendor profile by name (builder pattern).
    pub fn with_vendor(mut self, name: impl Into<String>) -> Self {
        self.profile = ProfileSelector::Vendor(name.into());
        self
    }
}

//! Vendor profiles and the override registry.
//!
//! A vendor profile maps (record type, field number) pairs to field codecs.
//! The registry holds profiles by name; each parse or serialize call resolves
//! one selector up front and uses the result, unchanged, for the whole call.

use super::{Base64FieldCodec, FieldCodec};
use nist_core::{FieldNumber, Location, NistError, RecordType, Result};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the built-in Morpho profile.
pub const MORPHO_PROFILE: &str = "morpho";

/// Which vendor profile a call uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileSelector {
    /// Standard layout for every field
    #[default]
    Default,
    /// Overrides of the named profile
    Vendor(String),
}

/// Field codec overrides of one vendor.
#[derive(Clone)]
pub struct VendorProfile {
    name: String,
    overrides: FxHashMap<(RecordType, FieldNumber), Arc<dyn FieldCodec>>,
}

impl VendorProfile {
    /// Empty profile
    pub fn new(name: impl Into<String>) -> Self {
        VendorProfile {
            name: name.into(),
            overrides: FxHashMap::default(),
        }
    }

    /// Override one field (builder pattern).
    pub fn with_override<C>(self, record_type: RecordType, field: FieldNumber, codec: C) -> Self
    where
        C: FieldCodec + 'static,
    {
        self.with_shared_override(record_type, field, Arc::new(codec))
    }

    /// Override one field with a shared codec (builder pattern).
    pub fn with_shared_override(
        mut self,
        record_type: RecordType,
        field: FieldNumber,
        codec: Arc<dyn FieldCodec>,
    ) -> Self {
        self.overrides.insert((record_type, field), codec);
        self
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec overriding `record_type.field`, if any
    pub fn codec_for(&self, record_type: RecordType, field: FieldNumber) -> Option<&dyn FieldCodec> {
        self.overrides
            .get(&(record_type, field))
            .map(|codec| codec.as_ref())
    }

    /// Overridden (type, field) pairs in ascending order
    pub fn overridden_fields(&self) -> Vec<(RecordType, FieldNumber)> {
        let mut fields: Vec<_> = self.overrides.keys().copied().collect();
        fields.sort_unstable();
        fields
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// No overrides?
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl fmt::Debug for VendorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<String> = self
            .overridden_fields()
            .into_iter()
            .filter_map(|(rt, field)| {
                self.codec_for(rt, field)
                    .map(|c| format!("{}.{:03}={}", rt, field, c.codec_id()))
            })
            .collect();
        overrides.sort();
        f.debug_struct("VendorProfile")
            .field("name", &self.name)
            .field("overrides", &overrides)
            .finish()
    }
}

/// Morpho: 9.184 carries a base64-encoded JAR archive.
pub fn morpho_profile() -> VendorProfile {
    VendorProfile::new(MORPHO_PROFILE).with_override(9, 184, Base64FieldCodec)
}

static BUILTIN: Lazy<OverrideRegistry> = Lazy::new(OverrideRegistry::with_builtin_profiles);

/// Named vendor profiles.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    profiles: FxHashMap<String, VendorProfile>,
}

impl OverrideRegistry {
    /// Registry without any profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in profiles (`morpho`)
    pub fn with_builtin_profiles() -> Self {
        let mut registry = Self::new();
        registry.register(morpho_profile());
        registry
    }

    /// Shared registry of built-in profiles
    pub fn builtin() -> &'static OverrideRegistry {
        &BUILTIN
    }

    /// Add a profile, returning the one it replaces.
    pub fn register(&mut self, profile: VendorProfile) -> Option<VendorProfile> {
        self.profiles.insert(profile.name.clone(), profile)
    }

    /// Add a profile (builder pattern).
    pub fn with_profile(mut self, profile: VendorProfile) -> Self {
        self.register(profile);
        self
    }

    /// Profile by name
    pub fn profile(&self, name: &str) -> Option<&VendorProfile> {
        self.profiles.get(name)
    }

    /// Registered profile names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a selector for one call.
    ///
    /// # Errors
    ///
    /// `UnsupportedVendorProfile` if the named profile is not registered.
    pub fn resolve(&self, selector: &ProfileSelector) -> Result<ResolvedProfile<'_>> {
        match selector {
            ProfileSelector::Default => Ok(ResolvedProfile { profile: None }),
            ProfileSelector::Vendor(name) => match self.profiles.get(name) {
                Some(profile) => Ok(ResolvedProfile {
                    profile: Some(profile),
                }),
                None => Err(NistError::UnsupportedVendorProfile {
                    profile: name.clone(),
                    location: Location::unknown(),
                }),
            },
        }
    }
}

/// A profile resolved for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProfile<'r> {
    profile: Option<&'r VendorProfile>,
}

impl ResolvedProfile<'static> {
    /// No overrides at all
    pub const fn standard() -> Self {
        ResolvedProfile { profile: None }
    }
}

impl<'r> ResolvedProfile<'r> {
    /// Name of the vendor profile, `None` for the standard layout
    pub fn name(&self) -> Option<&'r str> {
        self.profile.map(VendorProfile::name)
    }

    /// Override for `record_type.field`; `None` means the standard codec
    pub fn codec_for(&self, record_type: RecordType, field: FieldNumber) -> Option<&'r dyn FieldCodec> {
        self.profile.and_then(|p| p.codec_for(record_type, field))
    }
}

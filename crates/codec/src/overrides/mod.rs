//! Vendor override registry
//!
//! Vendors deviate from the standard layout of individual fields. Those
//! deviations are expressed as [`FieldCodec`] implementations registered per
//! (vendor, record type, field number) and consulted by the record assembler
//! before it falls back to the separator codec.

mod base64;
mod registry;
mod standard;
mod traits;

pub use self::base64::Base64FieldCodec;
pub use registry::{
    morpho_profile, OverrideRegistry, ProfileSelector, ResolvedProfile, VendorProfile,
    MORPHO_PROFILE,
};
pub use standard::StandardFieldCodec;
pub use traits::FieldCodec;

//! Base64 field codec.
//!
//! Some vendors store binary payloads (Morpho: a JAR archive in 9.184) as
//! base64 text inside an ordinary tagged field. This codec exposes the
//! decoded bytes to the model as a blob and re-encodes them on output.

use super::FieldCodec;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nist_core::{FieldValue, Location, NistError, Result};

/// Base64 text on the wire, raw bytes in the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64FieldCodec;

impl FieldCodec for Base64FieldCodec {
    fn encode(&self, value: &FieldValue, location: &Location) -> Result<Vec<u8>> {
        // Scalar text is already wire content; encoding it again would nest base64
        match value.as_blob() {
            Some(blob) => Ok(STANDARD.encode(blob.as_bytes()).into_bytes()),
            None => Err(NistError::encoding(
                *location,
                format!("base64 field expects binary content, got a {} value", value.kind_name()),
            )),
        }
    }

    fn decode(&self, bytes: &[u8], location: &Location) -> Result<FieldValue> {
        STANDARD
            .decode(bytes)
            .map(FieldValue::blob)
            .map_err(|e| NistError::invalid_field(*location, format!("invalid base64: {}", e)))
    }

    fn codec_id(&self) -> &str {
        "base64"
    }
}

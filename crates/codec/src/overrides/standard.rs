//! Standard field codec: the separator codec behind the `FieldCodec` seam.

use super::FieldCodec;
use crate::separator;
use nist_core::{FieldKind, FieldValue, Location, Result};

/// Separator codec for one field kind.
///
/// This is what the record assembler does when no override applies; vendor
/// codecs wrap it to reuse the RS/US layer.
#[derive(Debug, Clone, Copy)]
pub struct StandardFieldCodec {
    kind: FieldKind,
}

impl StandardFieldCodec {
    /// Codec for values of `kind`
    pub fn new(kind: FieldKind) -> Self {
        StandardFieldCodec { kind }
    }

    /// Field kind this codec was built for
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl FieldCodec for StandardFieldCodec {
    fn encode(&self, value: &FieldValue, location: &Location) -> Result<Vec<u8>> {
        separator::encode_value(value, self.kind, *location)
    }

    fn decode(&self, bytes: &[u8], location: &Location) -> Result<FieldValue> {
        separator::decode_value(bytes, self.kind, *location)
    }

    fn codec_id(&self) -> &str {
        "standard"
    }
}

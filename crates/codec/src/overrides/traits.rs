//! Field codec trait definitions.

use nist_core::{FieldValue, Location, Result};

/// Field codec trait.
///
/// Every field of a tagged record goes through a field codec on its way to
/// and from the wire. By default that is the separator codec; a vendor
/// profile swaps in its own codec for the (type, field) pairs it lays out
/// differently.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` so that one registry can serve parse and
/// serialize calls from several threads.
///
/// # Codec Identity
///
/// Each codec has an identifier that shows up in logs, so a surprising
/// value can be traced back to the override that produced it.
pub trait FieldCodec: Send + Sync {
    /// Encode a field value to the bytes between the field's colon and the
    /// next GS.
    ///
    /// The output of a non-blob field must not contain GS or FS; the record
    /// assembler rejects it with an encoding error otherwise.
    fn encode(&self, value: &FieldValue, location: &Location) -> Result<Vec<u8>>;

    /// Decode the raw bytes of a field.
    ///
    /// Reverses [`FieldCodec::encode`]; `decode(encode(v)) == v` for every
    /// value the codec accepts.
    fn decode(&self, bytes: &[u8], location: &Location) -> Result<FieldValue>;

    /// Codec identifier.
    fn codec_id(&self) -> &str;
}

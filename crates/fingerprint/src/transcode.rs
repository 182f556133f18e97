//! Vendor layouts as field codec overrides.

use crate::annotation::AnnotationKind;
use crate::layout::AnnotationLayout;
use nist_codec::{separator, FieldCodec};
use nist_core::{FieldKind, FieldValue, Location, Result};
use tracing::trace;

/// Reads and writes `wire` on the wire while the model holds `model`.
///
/// A vendor whose 9.012 uses five-digit coordinates registers one of these
/// for (9, 12); everything above the codec keeps seeing the standard layout.
#[derive(Debug, Clone)]
pub struct LayoutTranscodeCodec {
    wire: AnnotationLayout,
    model: AnnotationLayout,
    kind: AnnotationKind,
}

impl LayoutTranscodeCodec {
    /// Transcoder between a vendor `wire` layout and the `model` layout
    pub fn new(wire: AnnotationLayout, model: AnnotationLayout, kind: AnnotationKind) -> Self {
        LayoutTranscodeCodec { wire, model, kind }
    }

    /// Vendor minutiae layout on the wire, standard 9.012 layout in the model
    pub fn minutiae(wire: AnnotationLayout) -> Self {
        Self::new(wire, AnnotationLayout::minutiae(), AnnotationKind::Minutia)
    }
}

impl FieldCodec for LayoutTranscodeCodec {
    fn encode(&self, value: &FieldValue, location: &Location) -> Result<Vec<u8>> {
        let list = self.model.from_field_value(value, self.kind, *location)?;
        let wire = self.wire.to_field_value(&list, *location)?;
        trace!(target: "nist::fingerprint", annotations = list.len(), "Transcoded to vendor layout");
        separator::encode_value(&wire, FieldKind::Structured, *location)
    }

    fn decode(&self, bytes: &[u8], location: &Location) -> Result<FieldValue> {
        let wire = separator::decode_value(bytes, FieldKind::Structured, *location)?;
        let list = self.wire.from_field_value(&wire, self.kind, *location)?;
        trace!(target: "nist::fingerprint", annotations = list.len(), "Transcoded from vendor layout");
        self.model.to_field_value(&list, *location)
    }

    fn codec_id(&self) -> &str {
        "layout-transcode"
    }
}

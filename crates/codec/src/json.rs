//! JSON interchange
//!
//! ```json
//! { "1": { "0": { "2": "0502", "3": "1\u001f1\u001e2\u001f0" } },
//!   "2": { "0": { "4": "20240101" } } }
//! ```
//!
//! Text fields carry their wire text, separators included. Blob-kind fields
//! carry base64; a blob stored in a text field (vendor overrides) is written
//! as `{"base64": "..."}` so it comes back as a blob. Length fields are not
//! exported and the manifest is regenerated on import.

use crate::file::NistFile;
use crate::separator;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nist_core::{
    field_kind, FieldKind, FieldNumber, FieldValue, Location, NistError, RecordType, Result,
    MANIFEST_FIELD,
};
use serde_json::{Map, Value};
use tracing::debug;

const BASE64_KEY: &str = "base64";

/// Export `file`; blobs are skipped unless `include_binary` is set.
pub fn to_json(file: &NistFile, include_binary: bool) -> Result<Value> {
    let mut types: Map<String, Value> = Map::new();
    for record in file.records() {
        let mut fields = Map::new();
        for (field, value) in record.fields().filter(|(f, _)| *f != 1) {
            let location = record.location().with_field(field);
            let kind = field_kind(record.record_type(), field);
            let json = match value {
                FieldValue::Blob(_) if !include_binary => continue,
                FieldValue::Blob(blob) if kind == FieldKind::Blob => {
                    Value::String(STANDARD.encode(blob.as_bytes()))
                }
                FieldValue::Blob(blob) => {
                    let mut wrapped = Map::new();
                    wrapped.insert(
                        BASE64_KEY.to_string(),
                        Value::String(STANDARD.encode(blob.as_bytes())),
                    );
                    Value::Object(wrapped)
                }
                text => Value::String(wire_text(text, location)?),
            };
            fields.insert(field.to_string(), json);
        }

        let idcs = types
            .entry(record.record_type().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(idcs) = idcs {
            idcs.insert(record.idc().to_string(), Value::Object(fields));
        }
    }
    debug!(target: "nist::codec", records = file.len(), include_binary, "Exported file to JSON");
    Ok(Value::Object(types))
}

/// Rebuild a file from the output of [`to_json`].
///
/// # Errors
///
/// `Json` for a document of the wrong shape; otherwise whatever
/// [`NistFile::add`] reports for the records it describes.
pub fn from_json(json: &Value) -> Result<NistFile> {
    let types = as_object(json, Location::unknown())?;
    let mut file = NistFile::new();

    for (type_key, idcs) in types {
        let record_type: RecordType = parse_key(type_key, Location::unknown())?;
        let location = Location::record_type(record_type);
        for (idc_key, fields) in as_object(idcs, location)? {
            let idc: u32 = parse_key(idc_key, location)?;
            let location = Location::record(record_type, idc);

            let mut values: Vec<(FieldNumber, FieldValue)> = Vec::new();
            for (field_key, json) in as_object(fields, location)? {
                let field: FieldNumber = parse_key(field_key, location)?;
                let location = location.with_field(field);
                values.push((field, field_value(record_type, field, json, location)?));
            }

            if record_type == 1 {
                let header = file.header_mut();
                for (field, value) in values {
                    if field != 1 && field != MANIFEST_FIELD {
                        header.set_field(field, value)?;
                    }
                }
            } else {
                values.retain(|(field, _)| *field > 2);
                file.add(record_type, idc, values)?;
            }
        }
    }
    Ok(file)
}

fn wire_text(value: &FieldValue, location: Location) -> Result<String> {
    let bytes = separator::encode_value(value, FieldKind::Structured, location)?;
    String::from_utf8(bytes)
        .map_err(|_| NistError::json(location, "field is not valid UTF-8 text"))
}

fn field_value(
    record_type: RecordType,
    field: FieldNumber,
    json: &Value,
    location: Location,
) -> Result<FieldValue> {
    let kind = field_kind(record_type, field);
    match json {
        Value::String(text) if kind == FieldKind::Blob => decode_base64(text, location),
        Value::String(text) => separator::decode_value(text.as_bytes(), kind, location),
        Value::Object(map) => match map.get(BASE64_KEY) {
            Some(Value::String(text)) if map.len() == 1 => decode_base64(text, location),
            _ => Err(NistError::json(location, "expected {\"base64\": <text>}")),
        },
        other => Err(NistError::json(
            location,
            format!("expected a string, got {}", other),
        )),
    }
}

fn decode_base64(text: &str, location: Location) -> Result<FieldValue> {
    STANDARD
        .decode(text)
        .map(FieldValue::blob)
        .map_err(|e| NistError::json(location, format!("invalid base64: {}", e)))
}

fn as_object(value: &Value, location: Location) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| NistError::json(location, "expected an object"))
}

fn parse_key<T: std::str::FromStr>(key: &str, location: Location) -> Result<T> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NistError::json(location, format!("'{}' is not a number", key)));
    }
    key.parse()
        .map_err(|_| NistError::json(location, format!("'{}' out of range", key)))
}

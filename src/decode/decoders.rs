//! Envelope decoder implementation

use super::types::Page;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes the API's `data` envelopes into typed payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

impl EnvelopeDecoder {
    /// Create a new envelope decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a paginated envelope into a [`Page`]
    pub fn decode_page<T: DeserializeOwned>(&self, body: &str) -> Result<Page<T>> {
        let Some(mut data) = self.take_data(body)? else {
            return Ok(Page::empty());
        };

        let items = match take_field(&mut data, "items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    serde_json::from_value(value).map_err(|e| {
                        Error::decode(format!("Failed to decode item {index}: {e}"))
                    })
                })
                .collect::<Result<Vec<T>>>()?,
            Some(other) => {
                return Err(Error::decode(format!(
                    "Expected 'items' to be an array, got {}",
                    type_name(&other)
                )))
            }
        };

        let next_cursor = match take_field(&mut data, "next_cursor") {
            None | Some(Value::Null) => None,
            Some(Value::String(cursor)) => Some(cursor),
            Some(other) => {
                return Err(Error::decode(format!(
                    "Expected 'next_cursor' to be a string, got {}",
                    type_name(&other)
                )))
            }
        };

        Ok(Page::new(items, next_cursor))
    }

    /// Decode a non-paginated envelope, `None` when the payload is absent
    pub fn decode_data<T: DeserializeOwned>(&self, body: &str) -> Result<Option<T>> {
        let Some(mut root) = parse_root(body)? else {
            return Ok(None);
        };

        match take_field(&mut root, "data") {
            None | Some(Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| Error::decode(format!("Failed to decode data: {e}"))),
        }
    }

    /// Parse the body and pull out the `data` object
    fn take_data(&self, body: &str) -> Result<Option<JsonObject>> {
        let Some(mut root) = parse_root(body)? else {
            return Ok(None);
        };

        match take_field(&mut root, "data") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(data)) => Ok(Some(data)),
            Some(other) => Err(Error::decode(format!(
                "Expected 'data' to be an object, got {}",
                type_name(&other)
            ))),
        }
    }
}

/// Parse the body, `None` for a `null` root
fn parse_root(body: &str) -> Result<Option<JsonObject>> {
    let root: Value = serde_json::from_str(body).map_err(|e| Error::Decode {
        message: format!("Failed to parse JSON: {e}"),
    })?;

    match root {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(Error::decode(format!(
            "Expected an object at the envelope root, got {}",
            type_name(&other)
        ))),
    }
}

/// Remove a field, matching its name regardless of case and word separators
fn take_field(map: &mut JsonObject, name: &str) -> Option<Value> {
    if let Some(value) = map.remove(name) {
        return Some(value);
    }

    let wanted = normalize_key(name);
    let key = map.keys().find(|k| normalize_key(k) == wanted)?.clone();
    map.remove(&key)
}

/// `next_cursor`, `nextCursor` and `Next-Cursor` all normalize to `nextcursor`
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

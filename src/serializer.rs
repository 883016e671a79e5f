//! Serialization layer. Defaults to JSON via serde_json.
//!
//! Implement [`Serializer`] if you need a different on-disk format.

use crate::error::{Error, Result};
use crate::Document;
use serde_json::Value;

/// Converts documents to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a document to bytes.
    fn serialize(&self, doc: &[Value]) -> Result<Vec<u8>>;

    /// Decode bytes back into a document. Anything that isn't an array is
    /// rejected as [`Error::CorruptDocument`].
    fn deserialize(&self, bytes: &[u8]) -> Result<Document>;
}

/// JSON serializer, pretty-printed (2-space indent) or compact.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with 2-space indentation, so diffs of the data
    /// file stay readable.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// `true` when this serializer indents its output.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, doc: &[Value]) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Document> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Array(items) => Ok(items),
            other => Err(Error::CorruptDocument(format!(
                "expected a JSON array, found {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

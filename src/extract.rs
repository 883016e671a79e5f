//! Lenient recovery of a JSON array from loosely formatted text.
//!
//! Remote payloads sometimes arrive with commentary glued around the data
//! (`// users export` ... `[...]` ... `EOF`). These helpers keep everything
//! from the first `[` to the last `]` and parse only that. The local
//! read/replace path never goes through here.

use crate::error::{Error, Result};
use crate::Document;
use serde_json::Value;

/// Parse the slice between the first `[` and the last `]` of `text`.
///
/// Fails with [`Error::NoArrayFound`] when there is no such pair,
/// [`Error::CorruptDocument`] when the slice isn't valid JSON, and
/// [`Error::NotAnArray`] when it parses to something else.
pub fn extract_array(text: &str) -> Result<Document> {
    let start = text.find('[').ok_or(Error::NoArrayFound)?;
    let end = text.rfind(']').ok_or(Error::NoArrayFound)?;
    if end < start {
        return Err(Error::NoArrayFound);
    }
    // both indices sit on single-byte ASCII brackets, so the slice is on
    // char boundaries
    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate)? {
        Value::Array(items) => Ok(items),
        _ => Err(Error::NotAnArray),
    }
}

/// Like [`extract_array`], but logs the failure and hands back an empty
/// document instead of an error.
pub fn extract_array_or_empty(text: &str) -> Document {
    match extract_array(text) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("could not extract a JSON array from payload: {e}");
            Document::new()
        }
    }
}

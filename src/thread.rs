//! Message-archive file parsing.
//!
//! A message file is a JSON document of the shape:
//!
//! ```json
//! {
//!   "participants": [{ "name": "..." }],
//!   "messages": [
//!     { "sender_name": "...", "timestamp_ms": 0, "content": "..." },
//!     { "sender_name": "...", "timestamp_ms": 0, "photos": [] }
//!   ]
//! }
//! ```
//!
//! Only `messages[].sender_name` and `messages[].content` are read; every other
//! field is ignored.

use crate::error::{ExtractError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const MESSAGES_KEY: &str = "messages";

/// One record from a thread's `messages` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// Required key, but any JSON type is accepted; only a string can match.
    pub sender_name: Value,
    /// `None` when the key is absent. A present `null` is kept as
    /// `Some(Value::Null)` so it can be told apart from a missing key.
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Message {
    /// The sender as text, or `None` when `sender_name` is not a string.
    pub fn sender(&self) -> Option<&str> {
        self.sender_name.as_str()
    }
}

/// Read and parse one message file, returning its messages in file order.
pub fn parse_file(path: &Path) -> Result<Vec<Message>> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    parse_bytes(path, &bytes)
}

/// Parse already-loaded file contents. `path` is only used for error reporting.
pub fn parse_bytes(path: &Path, bytes: &[u8]) -> Result<Vec<Message>> {
    let doc: Value = serde_json::from_slice(bytes).map_err(|source| ExtractError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Object(mut root) = doc else {
        return Err(ExtractError::schema(path, "top-level value is not an object"));
    };
    let Some(messages) = root.remove(MESSAGES_KEY) else {
        return Err(ExtractError::schema(
            path,
            format!("missing `{MESSAGES_KEY}` key"),
        ));
    };
    let Value::Array(items) = messages else {
        return Err(ExtractError::schema(
            path,
            format!("`{MESSAGES_KEY}` is not an array"),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<Message>(item)
                .map_err(|e| ExtractError::schema(path, format!("message #{idx}: {e}")))
        })
        .collect()
}

use crate::error::{ExtractError, Result};
use crate::thread::Message;
use serde_json::Value;
use std::path::Path;

/// Return the text of `message` if it was sent by `sender` and has content.
///
/// The sender comparison is exact and case-sensitive; a non-string sender never
/// matches. A matching message whose
/// `content` is not a string is a schema error; non-matching messages are never
/// inspected past their sender.
pub fn select<'m>(message: &'m Message, sender: &str, path: &Path) -> Result<Option<&'m str>> {
    if message.sender() != Some(sender) {
        return Ok(None);
    }
    match &message.content {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(ExtractError::schema(
            path,
            format!("`content` from {sender:?} is {}, expected a string", kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

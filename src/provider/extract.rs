//! Fallible navigation through decoded JSON responses.

use serde_json::Value;
use thiserror::Error;

/// One hop along a response path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PathStep {
    Key(&'static str),
    Index(usize),
}

/// Describes the first hop that could not be followed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{detail} at {path}")]
pub(crate) struct ExtractError {
    /// JSONPath-like location of the failing hop, e.g. `$.choices[0]`.
    pub(crate) path: String,
    pub(crate) detail: String,
}

/// Follows `path` from `root` and returns the string found at the end.
pub(crate) fn text_at(root: &Value, path: &[PathStep]) -> Result<String, ExtractError> {
    let mut current = root;
    let mut location = String::from("$");

    for step in path {
        current = match (*step, current) {
            (PathStep::Key(key), Value::Object(map)) => {
                map.get(key).ok_or_else(|| ExtractError {
                    path: location.clone(),
                    detail: format!("missing key '{key}'"),
                })?
            }
            (PathStep::Index(index), Value::Array(items)) => {
                items.get(index).ok_or_else(|| ExtractError {
                    path: location.clone(),
                    detail: format!("index {index} out of range (length {})", items.len()),
                })?
            }
            (PathStep::Key(_), other) => {
                return Err(ExtractError {
                    path: location,
                    detail: format!("expected object, found {}", type_name(other)),
                });
            }
            (PathStep::Index(_), other) => {
                return Err(ExtractError {
                    path: location,
                    detail: format!("expected array, found {}", type_name(other)),
                });
            }
        };
        match step {
            PathStep::Key(key) => {
                location.push('.');
                location.push_str(key);
            }
            PathStep::Index(index) => location.push_str(&format!("[{index}]")),
        }
    }

    match current {
        Value::String(text) => Ok(text.clone()),
        other => Err(ExtractError {
            path: location,
            detail: format!("expected string, found {}", type_name(other)),
        }),
    }
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

#[cfg(test)]
mod tests {
    use super::PathStep::{Index, Key};
    use super::*;
    use serde_json::json;

    const PATH: [PathStep; 4] = [Key("choices"), Index(0), Key("message"), Key("content")];

    #[test]
    fn follows_nested_path() {
        let value = json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(text_at(&value, &PATH).unwrap(), "hello");
    }

    #[test]
    fn reports_missing_key_with_location() {
        let value = json!({"choices": [{"delta": {}}]});
        let err = text_at(&value, &PATH).unwrap_err();
        assert_eq!(err.path, "$.choices[0]");
        assert_eq!(err.detail, "missing key 'message'");
        assert_eq!(err.to_string(), "missing key 'message' at $.choices[0]");
    }

    #[test]
    fn reports_empty_array() {
        let value = json!({"choices": []});
        let err = text_at(&value, &PATH).unwrap_err();
        assert_eq!(err.path, "$.choices");
        assert!(err.detail.contains("index 0 out of range"), "{}", err.detail);
    }

    #[test]
    fn reports_type_mismatch() {
        let value = json!({"choices": {"0": {}}});
        let err = text_at(&value, &PATH).unwrap_err();
        assert_eq!(err.detail, "expected array, found object");

        let value = json!({"choices": [{"message": {"content": null}}]});
        let err = text_at(&value, &PATH).unwrap_err();
        assert_eq!(err.path, "$.choices[0].message.content");
        assert_eq!(err.detail, "expected string, found null");
    }

    #[test]
    fn top_level_non_object_is_rejected() {
        let err = text_at(&json!([1, 2]), &PATH).unwrap_err();
        assert_eq!(err.path, "$");
        assert_eq!(err.detail, "expected object, found array");
    }
}

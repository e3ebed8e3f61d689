//! Reply Check Service
//!
//! Decides whether an endpoint's JSON reply has the translation shape.
//! A reply that fails this check counts as a failed call even when the
//! transport succeeded.

use serde_json::Value;

/// Shape validation for translation replies.
///
/// The reply must be an object with a `data` field. With an expected text
/// configured, `data` must contain it; otherwise `data` must be non-empty.
#[derive(Debug, Clone, Default)]
pub struct ReplyCheck {
    expected: Option<String>,
}

impl ReplyCheck {
    /// Accept any non-empty `data`.
    pub fn non_empty() -> Self {
        Self { expected: None }
    }

    /// Require `data` to contain `expected`.
    pub fn containing(expected: impl Into<String>) -> Self {
        Self {
            expected: Some(expected.into()),
        }
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Check a decoded reply.
    pub fn accepts(&self, reply: &Value) -> bool {
        let Some(data) = reply.get("data") else {
            return false;
        };

        match (data, self.expected.as_deref()) {
            (Value::String(text), Some(expected)) => text.contains(expected),
            (Value::String(text), None) => !text.is_empty(),
            // Some endpoints return alternatives as a list of strings
            (Value::Array(items), Some(expected)) => items
                .iter()
                .any(|item| item.as_str().is_some_and(|s| s == expected)),
            (Value::Array(items), None) => !items.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_data_rejected() {
        let check = ReplyCheck::non_empty();
        assert!(!check.accepts(&json!({"code": 200})));
        assert!(!check.accepts(&json!("data")));
        assert!(!check.accepts(&json!(null)));
    }

    #[test]
    fn test_non_empty_data_accepted() {
        let check = ReplyCheck::non_empty();
        assert!(check.accepts(&json!({"code": 200, "data": "你好"})));
        assert!(check.accepts(&json!({"data": ["a"]})));
    }

    #[test]
    fn test_empty_data_rejected() {
        let check = ReplyCheck::non_empty();
        assert!(!check.accepts(&json!({"data": ""})));
        assert!(!check.accepts(&json!({"data": []})));
        assert!(!check.accepts(&json!({"data": null})));
        assert!(!check.accepts(&json!({"data": 42})));
    }

    #[test]
    fn test_expected_text() {
        let check = ReplyCheck::containing("你好，世界");
        assert_eq!(check.expected(), Some("你好，世界"));
        assert!(check.accepts(&json!({"data": "你好，世界！"})));
        assert!(!check.accepts(&json!({"data": "Hello, World!"})));
        assert!(check.accepts(&json!({"data": ["x", "你好，世界"]})));
        assert!(!check.accepts(&json!({"data": ["你好"]})));
    }
}

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Framework-level configuration errors, attributable to one check.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("required configuration key '{key}' is missing")]
    Missing { key: String },

    #[error("configuration key '{key}' has the wrong type, expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Typed, validated access to one check's raw option mapping.
///
/// Completeness validation (`missing_keys` / `is_complete`) is presence and
/// non-emptiness only. Value types are validated lazily at first access so a
/// check can report "configuration incomplete" before attempting any network
/// call.
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    values: BTreeMap<String, JsonValue>,
}

impl CheckOptions {
    pub fn new(values: BTreeMap<String, JsonValue>) -> Self {
        Self { values }
    }

    /// The value of `key` coerced to a string.
    ///
    /// Scalars coerce (numbers and booleans render in their canonical form);
    /// arrays, objects, and null do not.
    pub fn require_str(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.values.get(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })?;
        coerce_scalar(value).ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: "string",
        })
    }

    /// The value of `key` as an ordered list of strings.
    ///
    /// An absent key yields an empty list: optional expectation lists are a
    /// legitimate, common case. A present non-list value is a mismatch.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        match self.values.get(key) {
            None => Ok(Vec::new()),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| {
                    coerce_scalar(item).ok_or_else(|| ConfigError::TypeMismatch {
                        key: key.to_string(),
                        expected: "list of strings",
                    })
                })
                .collect(),
            Some(_) => Err(ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: "list of strings",
            }),
        }
    }

    /// The required keys that are absent or empty.
    pub fn missing_keys(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| !self.has_value(key))
            .map(|key| key.to_string())
            .collect()
    }

    /// True iff every required key is present and non-empty.
    pub fn is_complete(&self, required: &[&str]) -> bool {
        self.missing_keys(required).is_empty()
    }

    fn has_value(&self, key: &str) -> bool {
        match self.values.get(key) {
            None | Some(JsonValue::Null) => false,
            Some(JsonValue::String(s)) => !s.is_empty(),
            Some(JsonValue::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

fn coerce_scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: JsonValue) -> CheckOptions {
        let JsonValue::Object(map) = value else {
            panic!("test options must be an object");
        };
        CheckOptions::new(map.into_iter().collect())
    }

    #[test]
    fn require_str_returns_configured_value() {
        let opts = options(json!({ "dns_server": "9.9.9.9" }));
        assert_eq!(opts.require_str("dns_server").unwrap(), "9.9.9.9");
    }

    #[test]
    fn require_str_coerces_scalars() {
        let opts = options(json!({ "port": 53, "enabled": true }));
        assert_eq!(opts.require_str("port").unwrap(), "53");
        assert_eq!(opts.require_str("enabled").unwrap(), "true");
    }

    #[test]
    fn require_str_missing_key() {
        let opts = options(json!({}));
        assert_eq!(
            opts.require_str("dns_server"),
            Err(ConfigError::Missing {
                key: "dns_server".to_string()
            })
        );
    }

    #[test]
    fn require_str_rejects_lists() {
        let opts = options(json!({ "dns_server": ["9.9.9.9"] }));
        assert!(matches!(
            opts.require_str("dns_server"),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn string_list_absent_key_is_empty() {
        let opts = options(json!({}));
        assert_eq!(opts.string_list("expected_answer").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn string_list_preserves_order() {
        let opts = options(json!({ "expected_answer": ["b", "a", 3] }));
        assert_eq!(
            opts.string_list("expected_answer").unwrap(),
            vec!["b".to_string(), "a".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn string_list_rejects_non_lists_and_nested_values() {
        let opts = options(json!({ "expected_answer": "not-a-list" }));
        assert!(matches!(
            opts.string_list("expected_answer"),
            Err(ConfigError::TypeMismatch { .. })
        ));

        let opts = options(json!({ "expected_answer": [{ "nested": true }] }));
        assert!(matches!(
            opts.string_list("expected_answer"),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn completeness_is_presence_and_non_emptiness() {
        let opts = options(json!({
            "dns_server": "9.9.9.9",
            "dns_question": "",
            "expected_answer": [],
        }));
        assert_eq!(
            opts.missing_keys(&["dns_server", "dns_question", "dns_question_type", "expected_answer"]),
            vec![
                "dns_question".to_string(),
                "dns_question_type".to_string(),
                "expected_answer".to_string()
            ]
        );
        assert!(opts.is_complete(&["dns_server"]));
        assert!(!opts.is_complete(&["dns_question"]));
    }

    #[test]
    fn completeness_does_not_validate_types() {
        // A present list satisfies completeness even where a string is
        // expected; the mismatch surfaces lazily at access time.
        let opts = options(json!({ "dns_server": ["9.9.9.9"] }));
        assert!(opts.is_complete(&["dns_server"]));
        assert!(opts.require_str("dns_server").is_err());
    }
}

//! Redaction of sensitive fields before anything is logged
//!
//! The denylist is fixed. Matching is case-insensitive and treats `-` and `_`
//! as equivalent, so both the `secret-key` header and a `secret_key` JSON
//! field are caught. Redacted values are replaced wholesale.

use serde_json::Value;

/// Field and header names whose values must never be logged
pub const SENSITIVE_FIELDS: [&str; 5] = [
    "app_token",
    "access_token",
    "authorization",
    "secret_key",
    "secret",
];

/// Replacement written in place of a redacted value
pub const REDACTED: &str = "[REDACTED]";

/// Check whether a field or header name is on the denylist
pub fn is_sensitive(name: &str) -> bool {
    let normalized = name.trim().replace('-', "_");
    SENSITIVE_FIELDS
        .iter()
        .any(|field| field.eq_ignore_ascii_case(&normalized))
}

/// Redact every sensitive key in a JSON value, recursively
pub fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_sensitive(key) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact_value(field);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_denylisted_name_is_sensitive() {
        for name in SENSITIVE_FIELDS {
            assert!(is_sensitive(name), "{name} should be sensitive");
        }
    }

    #[test]
    fn matching_ignores_case_and_dashes() {
        assert!(is_sensitive("Authorization"));
        assert!(is_sensitive("APP-TOKEN"));
        assert!(is_sensitive("secret-key"));
    }

    #[test]
    fn unrelated_names_are_kept() {
        assert!(!is_sensitive("content-type"));
        assert!(!is_sensitive("secrets_manager_region"));
        assert!(!is_sensitive("user-agent"));
    }

    #[test]
    fn redacts_nested_objects_and_arrays() {
        let mut value = json!({
            "headers": {
                "authorization": "Bearer abc",
                "app_token": "eyJhbGciOi",
                "accept": "application/json"
            },
            "items": [{"secret": "s1"}, {"name": "kept"}],
            "secret_key": {"nested": "whole object dropped"}
        });

        redact_value(&mut value);

        assert_eq!(value["headers"]["authorization"], REDACTED);
        assert_eq!(value["headers"]["app_token"], REDACTED);
        assert_eq!(value["headers"]["accept"], "application/json");
        assert_eq!(value["items"][0]["secret"], REDACTED);
        assert_eq!(value["items"][1]["name"], "kept");
        assert_eq!(value["secret_key"], REDACTED);
    }

    #[test]
    fn scalars_are_untouched() {
        let mut value = json!("authorization");
        redact_value(&mut value);
        assert_eq!(value, json!("authorization"));
    }
}


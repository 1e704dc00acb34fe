//! Response variable capture

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::store::Bindings;
use crate::common::{Error, Result};

/// Read each requested field out of a decoded response document
///
/// `response_variables` maps a local variable name to a top-level field of the
/// response. Dotted field names are looked up literally, not as paths. The
/// first missing field fails the whole capture.
pub fn capture(
    document: &Map<String, Value>,
    response_variables: &BTreeMap<String, String>,
) -> Result<Bindings> {
    response_variables
        .iter()
        .map(|(local, field)| {
            document
                .get(field)
                .map(|value| (local.clone(), value.clone()))
                .ok_or_else(|| Error::MissingResponseField {
                    field: field.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_capture_top_level_fields() {
        let vars = BTreeMap::from([
            ("uid".to_string(), "id".to_string()),
            ("who".to_string(), "user".to_string()),
        ]);
        let bindings = capture(&doc(json!({"id": 42, "user": {"n": 1}, "x": 0})), &vars).unwrap();
        assert_eq!(
            bindings,
            vec![
                ("uid".to_string(), json!(42)),
                ("who".to_string(), json!({"n": 1})),
            ]
        );
    }

    #[test]
    fn test_missing_field_fails() {
        let vars = BTreeMap::from([("uid".to_string(), "id".to_string())]);
        let err = capture(&doc(json!({"ID": 1})), &vars).unwrap_err();
        assert!(matches!(err, Error::MissingResponseField { field } if field == "id"));
    }

    #[test]
    fn test_nested_paths_are_not_followed() {
        let vars = BTreeMap::from([("name".to_string(), "user.name".to_string())]);
        let err = capture(&doc(json!({"user": {"name": "a"}})), &vars).unwrap_err();
        assert!(matches!(err, Error::MissingResponseField { .. }));
    }
}

//! Deep placeholder substitution over endpoint definitions
//!
//! Everything here is pure: inputs are borrowed and a rewritten copy is
//! returned, with the shape of every structure preserved.

use serde_json::{Map, Value};

use super::store::VariableStore;
use super::template::render;
use crate::scenario::EndpointTest;

/// Substitute placeholders in a string, falling back to the input unchanged
/// when its placeholder syntax is malformed
pub fn substitute_str(input: &str, store: &VariableStore) -> String {
    match render(input, store) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(input, error = %e, "leaving malformed template untouched");
            input.to_string()
        }
    }
}

/// Substitute every string leaf of a value, recursing into mappings and lists
pub fn substitute_value(value: &Value, store: &VariableStore) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_str(s, store)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, store))
                .collect(),
        ),
        Value::Object(map) => Value::Object(substitute_map(map, store)),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Substitute the values of a mapping; keys are left as written
pub fn substitute_map(map: &Map<String, Value>, store: &VariableStore) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), substitute_value(value, store)))
        .collect()
}

/// Rewrite the request side of an endpoint against the current store
///
/// Expectations are left alone; they are substituted after the response
/// arrives, when this endpoint's own captures are available.
pub fn substitute_endpoint(endpoint: &EndpointTest, store: &VariableStore) -> EndpointTest {
    EndpointTest {
        url: substitute_str(&endpoint.url, store),
        method: substitute_str(&endpoint.method, store),
        headers: endpoint
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), substitute_str(value, store)))
            .collect(),
        body: endpoint.body.as_ref().map(|body| substitute_map(body, store)),
        multipart_fields: endpoint
            .multipart_fields
            .as_ref()
            .map(|fields| substitute_map(fields, store)),
        ..endpoint.clone()
    }
}

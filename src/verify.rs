//! Response verification
//!
//! Status is always checked first and short-circuits everything else. Bodies
//! are compared key by key on their canonical string form, so a YAML `5`
//! matches a JSON `"5"`.

use serde_json::{Map, Value};

use crate::common::{Error, MatchPolicy, Result};
use crate::vars::canonical_string;

/// A decoded response body
pub type Document = Map<String, Value>;

/// Fail unless the response carries the expected status
pub fn check_status(expected: u16, actual: u16) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::StatusMismatch { expected, actual })
    }
}

/// Decode a response body into a top-level mapping
///
/// JSON is tried first and YAML second, which also covers YAML-speaking
/// endpoints. An empty body decodes to an empty document.
pub fn decode_document(body: &[u8]) -> Result<Document> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(json_err) => serde_yaml::from_slice(body).map_err(|yaml_err| {
            tracing::debug!(%json_err, %yaml_err, "response body is neither JSON nor YAML");
            Error::ResponseDecode(yaml_err.to_string())
        })?,
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        other => Err(Error::ResponseDecode(format!(
            "expected a mapping at the top level, got {}",
            truncate(&other.to_string(), 80)
        ))),
    }
}

/// Compare a decoded body against an expected (already substituted) mapping
pub fn check_body(expected: &Map<String, Value>, actual: &Document, policy: MatchPolicy) -> Result<()> {
    for (key, expected_value) in expected {
        let actual_value = actual
            .get(key)
            .ok_or_else(|| Error::ExpectedKeyMissing { key: key.clone() })?;

        let expected_text = canonical_string(expected_value);
        let actual_text = canonical_string(actual_value);
        if expected_text != actual_text {
            return Err(Error::value_mismatch(key, &expected_text, &actual_text));
        }
    }

    if policy == MatchPolicy::Exact {
        if let Some(extra) = actual.keys().find(|key| !expected.contains_key(*key)) {
            return Err(Error::UnexpectedKey { key: extra.clone() });
        }
    }

    Ok(())
}

/// Verify a raw response in one call: status, then body
///
/// The body is only decoded when there is an expectation to check it
/// against.
pub fn verify(
    expected_status: u16,
    actual_status: u16,
    expected_response: Option<&Map<String, Value>>,
    actual_body: &[u8],
    policy: MatchPolicy,
) -> Result<()> {
    check_status(expected_status, actual_status)?;
    if let Some(expected) = expected_response {
        let document = decode_document(actual_body)?;
        check_body(expected, &document, policy)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

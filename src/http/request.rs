//! Request builder
//!
//! Turns an already-substituted endpoint into a transport-ready request. All
//! validation happens here, so a malformed endpoint fails before anything
//! touches the network.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, Url};
use serde_json::Value;

use crate::common::{Error, Result};
use crate::scenario::EndpointTest;

/// Body of an outgoing request
#[derive(Debug)]
pub enum RequestBody {
    /// No body at all
    Empty,
    /// Serialized JSON document
    Json(Vec<u8>),
    /// Form fields; `fields` mirrors the form for request dumps
    Multipart {
        form: Form,
        fields: Vec<(String, String)>,
    },
}

/// A request ready to hand to a [`Transport`](super::Transport)
#[derive(Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Build a request from an endpoint definition
///
/// Multipart fields win over a JSON body when both are present. Generated
/// headers (`Content-Type`) are set first and the endpoint's own headers are
/// applied last, so they can override them.
pub fn build(endpoint: &EndpointTest) -> Result<PreparedRequest> {
    let method = parse_method(&endpoint.method)?;
    let url = Url::parse(&endpoint.url).map_err(|e| {
        Error::RequestConstruction(format!("invalid URL '{}': {}", endpoint.url, e))
    })?;

    let mut headers = HeaderMap::new();

    let body = match endpoint.form_fields() {
        Some(fields) => {
            let fields = fields
                .iter()
                .map(|(name, value)| match value {
                    Value::String(s) => Ok((name.clone(), s.clone())),
                    other => Err(Error::invalid_field_type(name, value_kind(other))),
                })
                .collect::<Result<Vec<_>>>()?;

            let form = fields
                .iter()
                .fold(Form::new(), |form, (name, value)| {
                    form.text(name.clone(), value.clone())
                });
            let content_type = format!("multipart/form-data; boundary={}", form.boundary());
            headers.insert(CONTENT_TYPE, header_value(&content_type)?);

            RequestBody::Multipart { form, fields }
        }
        None => match &endpoint.body {
            Some(body) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                RequestBody::Json(serde_json::to_vec(body)?)
            }
            None => RequestBody::Empty,
        },
    };

    for (name, value) in &endpoint.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::RequestConstruction(format!("invalid header name '{}': {}", name, e))
        })?;
        headers.insert(name, header_value(value)?);
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

fn parse_method(method: &str) -> Result<Method> {
    let method = method.trim();
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| Error::RequestConstruction(format!("invalid method '{}': {}", method, e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        Error::RequestConstruction(format!("invalid header value '{}': {}", value, e))
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

impl PreparedRequest {
    /// Human-readable dump of the request, one line per entry
    pub fn dump_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} {} HTTP/1.1", self.method, self.url)];
        if let Some(host) = self.url.host_str() {
            lines.push(format!("Host: {}", host));
        }
        lines.extend(header_lines(&self.headers));
        lines.push(String::new());

        match &self.body {
            RequestBody::Empty => {}
            RequestBody::Json(bytes) => {
                lines.extend(String::from_utf8_lossy(bytes).lines().map(str::to_string))
            }
            RequestBody::Multipart { form, fields } => {
                for (name, value) in fields {
                    lines.push(format!("--{}", form.boundary()));
                    lines.push(format!(
                        "Content-Disposition: form-data; name=\"{}\"",
                        name
                    ));
                    lines.push(String::new());
                    lines.push(value.clone());
                }
                lines.push(format!("--{}--", form.boundary()));
            }
        }
        lines
    }
}

pub(crate) fn header_lines(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            format!(
                "{}: {}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            )
        })
        .collect()
}

//! Transport-independent response type

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::request::header_lines;

/// A fully-read HTTP response
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Human-readable dump of the response, one line per entry
    pub fn dump_lines(&self) -> Vec<String> {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        let mut lines = vec![format!("HTTP/1.1 {} {}", self.status, reason)
            .trim_end()
            .to_string()];
        lines.extend(header_lines(&self.headers));
        lines.push(String::new());
        lines.extend(
            String::from_utf8_lossy(&self.body)
                .lines()
                .map(str::to_string),
        );
        lines
    }
}

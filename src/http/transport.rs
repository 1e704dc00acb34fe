//! HTTP transport
//!
//! The runner only needs "send this request, give me the response". The
//! reqwest-backed [`HttpTransport`] is the production implementation; tests
//! substitute their own.

use async_trait::async_trait;
use std::time::Duration;

use super::request::{PreparedRequest, RequestBody};
use super::response::HttpResponse;
use crate::common::config::HttpConfig;
use crate::common::{Error, Result};

/// Something that can carry a request to a server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and read the full response body
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport from the `[http]` config section
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart { form, .. } => builder.multipart(form),
        };
        // Headers last: they carry the builder's Content-Type and any user
        // overrides, and replace whatever reqwest generated
        builder = builder.headers(headers);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(error = %e, "request timed out");
                Error::Transport(format!("request timed out: {}", e))
            } else {
                Error::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("reading the endpoint's response: {}", e)))?
            .to_vec();

        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

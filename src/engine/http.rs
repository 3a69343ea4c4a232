// ABOUTME: HTTP step builder and transport abstraction
// ABOUTME: Renders step URL, body, and headers into a request and sends it through a pluggable client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::error::{BoxError, ExecutionError, Result};
use crate::model::Step;
use crate::render::Renderer;

/// Transport-agnostic request built from a step
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Send(BoxError),

    #[error("reading response failed: {0}")]
    Read(BoxError),
}

/// HTTP client collaborator. Implementations must be safe to share across
/// concurrent executions.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Build a request from an HTTP step. The URL, body, and each header value
/// are rendered independently; the method is used verbatim.
pub fn build_request(step: &Step, renderer: &Renderer, data: &JsonValue) -> Result<HttpRequest> {
    if step.url.is_empty() {
        return Err(ExecutionError::EmptyUrl);
    }
    let label = step.label();

    let url = renderer
        .render(&step.url, data)
        .map_err(|e| ExecutionError::render(&label, "url", e))?;

    let body = if step.body.is_empty() {
        None
    } else {
        Some(
            renderer
                .render_bytes(&step.body, data)
                .map_err(|e| ExecutionError::render(&label, "body", e))?,
        )
    };

    let method = Method::from_bytes(step.method_or_default().as_bytes()).map_err(|e| {
        ExecutionError::RequestBuildFailed {
            step: label.clone(),
            reason: format!("invalid method \"{}\": {}", step.method, e),
        }
    })?;

    let url = Url::parse(&url).map_err(|e| ExecutionError::RequestBuildFailed {
        step: label.clone(),
        reason: format!("invalid url \"{}\": {}", url, e),
    })?;

    let mut headers = HeaderMap::new();
    for (name, values) in &step.header {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExecutionError::RequestBuildFailed {
                step: label.clone(),
                reason: format!("invalid header name \"{}\": {}", name, e),
            })?;

        for value in values.iter() {
            let rendered = renderer
                .render(value, data)
                .map_err(|e| ExecutionError::render(&label, format!("header \"{}\"", name), e))?;
            let header_value =
                HeaderValue::from_str(&rendered).map_err(|e| ExecutionError::RequestBuildFailed {
                    step: label.clone(),
                    reason: format!("invalid value for header \"{}\": {}", name, e),
                })?;
            headers.append(header_name.clone(), header_value);
        }
    }

    Ok(HttpRequest {
        method,
        url,
        body,
        headers,
    })
}

/// Default transport backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_settings(timeout: Duration, user_agent: &str) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        debug!("Sending {} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Send(Box::new(e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Read(Box::new(e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

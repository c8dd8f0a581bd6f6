//! # HTTP Service
//!
//! Sends parsed requests over the network with `reqwest` and turns the reply
//! into a [`Response`] ready for display.

use crate::config::HttpConfig;
use crate::repl::models::{BodyKind, Request, Response, ResponseStatus};
use crate::repl::services::decoder::{decode_body, DecodeError};
use reqwest::{
    header::{HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE},
    Client, Method, Version,
};
use std::future::Future;
use std::time::Instant;
use thiserror::Error;

/// Failures while sending a request; shown in the response pane
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not supported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Anything that can turn a [`Request`] into a [`Response`].
///
/// Implementations must be shareable across dispatch tasks.
pub trait RequestExecutor: Send + Sync + 'static {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, DispatchError>> + Send;
}

/// `reqwest` backed executor
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    scheme: String,
}

impl HttpExecutor {
    pub fn new(config: &HttpConfig) -> Result<Self, DispatchError> {
        let mut builder = Client::builder()
            .http1_title_case_headers()
            .danger_accept_invalid_certs(config.insecure);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(scheme = %config.scheme, insecure = config.insecure, "building HTTP client");
        Ok(Self {
            client: builder.build()?,
            scheme: config.scheme.clone(),
        })
    }

    /// Absolute URL for a request.
    ///
    /// Absolute targets are used as given. A path target is joined to the
    /// request's Host (the captured Host line or a `Host` header) using the
    /// configured scheme.
    pub fn resolve_url(&self, request: &Request) -> Result<String, DispatchError> {
        let target = request.target.trim();
        let lowered = target.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Ok(target.to_string());
        }

        let host = request
            .host
            .as_deref()
            .or_else(|| request.headers.get_ignore_case("host"))
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| {
                DispatchError::InvalidRequest(format!(
                    "target '{target}' is not an absolute URL and no Host was given"
                ))
            })?;

        if target.starts_with('/') {
            Ok(format!("{}://{host}{target}", self.scheme))
        } else {
            Ok(format!("{}://{host}/{target}", self.scheme))
        }
    }

    fn build(&self, request: &Request) -> Result<reqwest::Request, DispatchError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
        let url = self.resolve_url(request)?;

        let mut builder = self.client.request(method, &url);

        match request.http_version.as_str() {
            "1.0" => builder = builder.version(Version::HTTP_10),
            "1.1" => builder = builder.version(Version::HTTP_11),
            other => tracing::debug!(version = other, "leaving HTTP version to the client"),
        }

        for (key, value) in request.headers.iter() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| DispatchError::InvalidRequest(format!("bad header name '{key}'")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| DispatchError::InvalidRequest(format!("bad value for '{key}'")))?;
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = match body.kind {
                BodyKind::Json => {
                    let value: serde_json::Value = serde_json::from_str(&body.content)
                        .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
                    builder.json(&value)
                }
                BodyKind::PlainText | BodyKind::FormUrlEncoded => builder.body(body.content.clone()),
                BodyKind::MultipartFormData => {
                    return Err(DispatchError::Unsupported(
                        "sending multipart/form-data bodies".to_string(),
                    ))
                }
            };
        }

        Ok(builder.build()?)
    }

    async fn send(&self, request: Request) -> Result<Response, DispatchError> {
        let http_request = self.build(&request)?;
        tracing::info!(method = %request.method, url = %http_request.url(), "sending request");

        let started = Instant::now();
        let reply = self.client.execute(http_request).await?;

        let status = reply.status();
        let version = format!("{:?}", reply.version());
        let headers: Vec<(String, String)> = reply
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let content_encoding = reply
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_type = reply
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let raw = reply.bytes().await?;
        let duration_ms = started.elapsed().as_millis() as u64;
        let body = decode_body(raw, content_encoding.as_deref(), content_type.as_deref())?;

        tracing::info!(status = status.as_u16(), duration_ms, "response received");

        Ok(Response {
            status: ResponseStatus::new(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ),
            version,
            headers,
            body,
            duration_ms: Some(duration_ms),
        })
    }
}

impl RequestExecutor for HttpExecutor {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, DispatchError>> + Send {
        self.send(request)
    }
}

//! HTTP transport boundary
//!
//! The connection builds complete [`HttpRequest`]s (headers included) and hands
//! them to a [`Transport`]. Cookies are never stored by the transport; the
//! session decides which cookie to send.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};

use super::models::Credentials;
use crate::error::Result;

/// One outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub basic_auth: Option<Credentials>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            basic_auth: None,
            body: None,
        }
    }

    /// Header value as text, if present and printable
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

/// What came back, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, url: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url: url.into(),
            body: Vec::new(),
        }
    }

    /// Append a header; repeated names such as `Set-Cookie` accumulate
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must not follow the session protocol themselves; any status
/// code is a successful transport result.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse>;
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(credentials) = &request.basic_auth {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.bytes()?.to_vec();
        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(RawResponse {
            status,
            headers,
            url,
            body,
        })
    }
}

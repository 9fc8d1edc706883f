//! Interpreted result of one request
//!
//! The body is materialized lazily, either as text or as a parsed XML document.
//! Whichever form is requested first wins; asking for the other form afterwards
//! is an error.

use once_cell::unsync::OnceCell;
use reqwest::StatusCode;
use reqwest::header::{ETAG, HeaderMap, LOCATION};

use super::constants::headers::SAP_MESSAGE;
use super::transport::RawResponse;
use crate::codec::xml::{self, XmlDocument};
use crate::error::{ODataError, Result};

const MESSAGE_ELEMENT: &str = "message";

#[derive(Debug)]
enum Body {
    Text(String),
    Document(XmlDocument),
}

#[derive(Debug)]
pub struct ODataResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    payload: Option<String>,
    raw: Vec<u8>,
    body: OnceCell<Body>,
}

impl ODataResponse {
    /// Wrap a transport response, echoing the URL and payload that produced it
    pub fn new(raw: RawResponse, request_url: &str, payload: Option<String>) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            url: request_url.to_string(),
            payload,
            raw: raw.body,
            body: OnceCell::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_message(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }

    /// `"404 Not Found"`
    pub fn status_line(&self) -> String {
        match self.status_message() {
            Some(reason) => format!("{} {}", self.status_code(), reason),
            None => self.status_code().to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn etag(&self) -> Option<&str> {
        self.headers.get(ETAG).and_then(|value| value.to_str().ok())
    }

    /// URL of a newly created resource
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|value| value.to_str().ok())
    }

    pub fn sap_message(&self) -> Option<&str> {
        self.header(SAP_MESSAGE)
    }

    pub fn request_url(&self) -> &str {
        &self.url
    }

    pub fn request_payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Body as text; fails if the body was already read as a document
    pub fn text(&self) -> Result<&str> {
        let body = self
            .body
            .get_or_init(|| Body::Text(String::from_utf8_lossy(&self.raw).into_owned()));
        match body {
            Body::Text(text) => Ok(text),
            Body::Document(_) => Err(ODataError::BodyConsumed {
                url: self.url.clone(),
                kind: "a document",
            }),
        }
    }

    /// Body as a parsed document; fails if the body was already read as text
    pub fn document(&self) -> Result<&XmlDocument> {
        let body = self.body.get_or_try_init(|| {
            XmlDocument::parse(&String::from_utf8_lossy(&self.raw))
                .map(Body::Document)
                .map_err(|source| ODataError::Xml {
                    url: self.url.clone(),
                    source,
                })
        })?;
        match body {
            Body::Document(document) => Ok(document),
            Body::Text(_) => Err(ODataError::BodyConsumed {
                url: self.url.clone(),
                kind: "text",
            }),
        }
    }

    /// The text body re-indented for display, or as-is when it is not XML
    pub fn document_as_string(&self) -> Result<String> {
        let text = self.text()?;
        Ok(xml::pretty_print(text).unwrap_or_else(|| text.to_string()))
    }

    /// Server-provided error text from the first `message` element, if any
    pub fn server_message(&self) -> Option<String> {
        match self.body.get() {
            Some(Body::Document(document)) => {
                document.first_text(MESSAGE_ELEMENT).map(str::to_string)
            }
            Some(Body::Text(text)) => XmlDocument::parse(text)
                .ok()
                .and_then(|document| document.first_text(MESSAGE_ELEMENT).map(str::to_string)),
            None => self
                .document()
                .ok()
                .and_then(|document| document.first_text(MESSAGE_ELEMENT))
                .map(str::to_string),
        }
    }

    /// `"<code> <reason>"`, plus `": <server message>"` when one can be extracted
    pub fn error_message(&self) -> String {
        match self.server_message() {
            Some(message) => format!("{}: {}", self.status_line(), message),
            None => self.status_line(),
        }
    }
}

//! Error types for the mapping, codec, session and protocol layers.
//!
//! Every fallible operation in the crate returns [`ODataError`]. The variants
//! mirror the failure classes of an OData exchange: a record type that cannot be
//! mapped, remote data that does not fit the local type, a non-success status, or
//! a session that could not be established. Nothing is retried internally.

use std::fmt;

use crate::mapping::{AccessorKind, Role};

/// Boxed error returned by record field setters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for all OData operations
#[derive(Debug, thiserror::Error)]
pub enum ODataError {
    /// The record type cannot be mapped (local, never retried)
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Remote data lacks a property the local type expects
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// CSRF token, session cookie or etag could not be obtained
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The server answered with an unexpected status code
    #[error("{operation} request failed with response code: {message}\nurl: {url}{}", payload_suffix(.payload))]
    Protocol {
        operation: &'static str,
        status: u16,
        message: String,
        url: String,
        payload: Option<String>,
    },

    /// A field setter rejected the string value received from the server
    #[error("{record}: cannot set property '{property}' from value {value:?}: {source}")]
    FieldConversion {
        record: &'static str,
        property: String,
        value: String,
        #[source]
        source: BoxError,
    },

    /// The `$count` endpoint returned something that is not a number
    #[error("count response is not a number: {body:?}\nurl: {url}")]
    InvalidCount { url: String, body: String },

    /// The response body was already materialized in the other representation
    #[error("response body from {url} was already read as {kind}")]
    BodyConsumed { url: String, kind: &'static str },

    /// The response body could not be parsed as XML
    #[error("malformed XML in response from {url}: {source}")]
    Xml {
        url: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A caller supplied an argument the protocol cannot express
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No connection has been opened for the record type
    #[error("no connection registered for record type {record}")]
    NotRegistered { record: &'static str },

    /// A session value cannot be sent as an HTTP header
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// A non-reqwest transport failed to deliver the request
    #[error("transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// HTTP client error (reqwest)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn payload_suffix(payload: &Option<String>) -> String {
    match payload {
        Some(payload) => format!("\npayload: {}", payload),
        None => String::new(),
    }
}

impl ODataError {
    /// Attach the request URL to deserialization errors that do not carry one yet.
    pub fn with_request_url(self, url: &str) -> Self {
        match self {
            ODataError::Deserialization(err) if err.url().is_none() => {
                ODataError::Deserialization(err.with_url(url))
            }
            other => other,
        }
    }

    /// HTTP status code for protocol errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ODataError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience result alias using [`ODataError`]
pub type Result<T> = std::result::Result<T, ODataError>;

/// A record type's descriptor cannot satisfy a mapping request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("field '{field}' of {record} has no {accessor} accessor")]
    MissingAccessor {
        record: &'static str,
        field: &'static str,
        accessor: AccessorKind,
    },

    #[error("in record type '{record}', fields of role {role} may not share the wire name '{wire_name}'")]
    DuplicateWireName {
        record: &'static str,
        role: Role,
        wire_name: &'static str,
    },

    #[error("no fields found with role {role} in {record}")]
    NoFieldsForRole { record: &'static str, role: Role },

    #[error("field '{field}' of {record} returned null")]
    NullValue {
        record: &'static str,
        field: &'static str,
    },

    #[error("field '{field}' of {record} cannot be rendered: {reason}")]
    Unrenderable {
        record: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("XML document must contain exactly one OData entry, found {actual}")]
    EntryCount { actual: usize },
}

/// The server entity does not have a property the local record expects.
///
/// Raised without context by the codec; the connection adds the local type and
/// the request URL before the error reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializationError {
    missing_property: String,
    local_type: Option<&'static str>,
    url: Option<String>,
}

impl DeserializationError {
    pub fn new(missing_property: impl Into<String>) -> Self {
        Self {
            missing_property: missing_property.into(),
            local_type: None,
            url: None,
        }
    }

    pub fn with_local_type(mut self, local_type: &'static str) -> Self {
        self.local_type = Some(local_type);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn missing_property(&self) -> &str {
        &self.missing_property
    }

    pub fn local_type(&self) -> Option<&'static str> {
        self.local_type
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deserialization mismatch: the server entity does not have property: {}",
            self.missing_property
        )?;
        if let Some(local_type) = self.local_type {
            write!(f, "\nlocal type: {}", local_type)?;
        }
        if let Some(url) = &self.url {
            write!(f, "\nurl: {}", url)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeserializationError {}

/// The session could not be established or refreshed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("failed to obtain x-csrf-token\nurl: {url}")]
    MissingCsrfToken { url: String },

    #[error("failed to obtain session cookie\nurl: {url}")]
    MissingCookie { url: String },

    #[error("failed to obtain etag: {message}\nurl: {url}{}", payload_suffix(.payload))]
    MissingEtag {
        message: String,
        url: String,
        payload: Option<String>,
    },
}

//! Connection configuration with builder pattern
//!
//! Everything a connection needs to talk to one entity set: the service root,
//! the entity name, credentials, date formatting and transport settings.

use std::time::Duration;

use chrono_tz::Tz;

use super::constants::DEFAULT_SESSION_COOKIE_MARKER;
use super::models::Credentials;
use crate::error::{ODataError, Result};
use crate::mapping::ODataDateFormat;

/// Configuration for one connection
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Service root, always ending in `/`
    pub service_root_url: String,
    /// Entity set name, never ending in `/`
    pub entity_name: String,
    pub credentials: Credentials,
    pub dates: ODataDateFormat,
    /// Substring that identifies the session cookie among `Set-Cookie` headers
    pub session_cookie_marker: String,
    /// Transport timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            service_root_url: String::new(),
            entity_name: String::new(),
            credentials: Credentials::default(),
            dates: ODataDateFormat::default(),
            session_cookie_marker: DEFAULT_SESSION_COOKIE_MARKER.to_string(),
            timeout: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a new builder for ConnectionConfig
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        validate_service_root(&self.service_root_url)?;
        validate_entity_name(&self.entity_name)?;
        if self.session_cookie_marker.is_empty() {
            return Err(ODataError::InvalidArgument(
                "session cookie marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Same service and credentials, different entity set
    pub fn for_entity(&self, entity_name: &str) -> Result<Self> {
        validate_entity_name(entity_name)?;
        Ok(Self {
            entity_name: entity_name.to_string(),
            ..self.clone()
        })
    }
}

pub(crate) fn validate_service_root(url: &str) -> Result<()> {
    if url.is_empty() || !url.ends_with('/') {
        return Err(ODataError::InvalidArgument(format!(
            "service root URL must not be empty and must end with a '/' character: {:?}",
            url
        )));
    }
    Ok(())
}

pub(crate) fn validate_entity_name(name: &str) -> Result<()> {
    if name.is_empty() || name.ends_with('/') {
        return Err(ODataError::InvalidArgument(format!(
            "entity name must not be empty and must not end with a '/' character: {:?}",
            name
        )));
    }
    Ok(())
}

/// Builder for ConnectionConfig
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ConnectionConfig::default(),
        }
    }

    /// Set the service root; a missing trailing `/` is rejected by `build`
    pub fn service_root_url(mut self, url: impl Into<String>) -> Self {
        self.config.service_root_url = url.into();
        self
    }

    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.config.entity_name = name.into();
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Credentials::new(username, password);
        self
    }

    /// Time zone in which `datetime'...'` literals are written
    pub fn time_zone(mut self, time_zone: Tz) -> Self {
        self.config.dates.set_time_zone(time_zone);
        self
    }

    /// Write or omit milliseconds in date literals
    pub fn millis(mut self, millis: bool) -> Self {
        self.config.dates = self.config.dates.with_millis(millis);
        self
    }

    pub fn session_cookie_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.session_cookie_marker = marker.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<ConnectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConnectionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

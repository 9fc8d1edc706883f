//! CSRF token and session cookie for one service root

use log::debug;
use reqwest::header::{HeaderMap, SET_COOKIE};

use super::constants::headers::X_CSRF_TOKEN;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token or no cookie yet
    Uninitialized,
    /// Token and cookie held
    Active,
}

/// How a mutating request obtains its `If-Match` etag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// Fetch the current etag with a GET on the target URL
    #[default]
    Fetch,
    /// Send no `If-Match` at all
    Skip,
    /// Use this etag as-is
    Known(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    csrf_token: Option<String>,
    cookie: Option<String>,
    cookie_marker: String,
}

impl Session {
    pub fn new(cookie_marker: impl Into<String>) -> Self {
        Self {
            csrf_token: None,
            cookie: None,
            cookie_marker: cookie_marker.into(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.csrf_token.is_some() && self.cookie.is_some() {
            SessionState::Active
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Replace the held cookie, e.g. with one shared from another connection
    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = Some(cookie.into());
    }

    /// A harvesting GET is due when the session is incomplete or an etag is
    /// required but unknown
    pub fn needs_refresh(&self, needs_etag: bool, etag_known: bool) -> bool {
        self.state() == SessionState::Uninitialized || (needs_etag && !etag_known)
    }

    /// Take the CSRF token and session cookie from a GET response.
    ///
    /// The token is always replaced by what the server sent. The cookie is only
    /// replaced when a `Set-Cookie` carries the session marker.
    pub fn absorb(&mut self, url: &str, headers: &HeaderMap) -> Result<(), SessionError> {
        self.csrf_token = headers
            .get(X_CSRF_TOKEN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if self.csrf_token.is_none() {
            return Err(SessionError::MissingCsrfToken {
                url: url.to_string(),
            });
        }

        let session_cookie = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|cookie| cookie.contains(&self.cookie_marker));
        if let Some(cookie) = session_cookie {
            debug!("Session cookie received from {}", url);
            self.cookie = Some(cookie.to_string());
        }
        if self.cookie.is_none() {
            return Err(SessionError::MissingCookie {
                url: url.to_string(),
            });
        }

        Ok(())
    }
}

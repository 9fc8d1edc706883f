//! One connection per record type
//!
//! The registry is the explicit home for connections that would otherwise be
//! looked up globally by record type. All connections share one transport and,
//! once set, one session cookie.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::client::ODataConnection;
use super::config::ConnectionConfig;
use super::transport::{ReqwestTransport, Transport};
use crate::error::{ODataError, Result};
use crate::mapping::Record;

pub struct ConnectionRegistry {
    base: ConnectionConfig,
    transport: Arc<dyn Transport>,
    connections: HashMap<TypeId, ODataConnection>,
    cookie: Option<String>,
}

impl ConnectionRegistry {
    /// Registry over reqwest; `base` supplies everything except the entity name
    pub fn new(base: ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(base.timeout)?;
        Ok(Self::with_transport(base, Arc::new(transport)))
    }

    pub fn with_transport(base: ConnectionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base,
            transport,
            connections: HashMap::new(),
            cookie: None,
        }
    }

    /// Open the connection for `R` against `entity_name`.
    ///
    /// An already open connection for `R` is returned unchanged.
    pub fn open<R: Record>(&mut self, entity_name: &str) -> Result<&mut ODataConnection> {
        let type_id = TypeId::of::<R>();
        if !self.connections.contains_key(&type_id) {
            let config = self.base.for_entity(entity_name)?;
            let mut connection = ODataConnection::with_transport(config, Arc::clone(&self.transport))?;
            if let Some(cookie) = &self.cookie {
                connection.set_cookie(cookie.clone());
            }
            debug!(
                "Opened connection for {} on {}",
                R::descriptor().type_name(),
                entity_name
            );
            self.connections.insert(type_id, connection);
        }
        self.connection::<R>()
    }

    pub fn connection<R: Record>(&mut self) -> Result<&mut ODataConnection> {
        self.connections
            .get_mut(&TypeId::of::<R>())
            .ok_or(ODataError::NotRegistered {
                record: R::descriptor().type_name(),
            })
    }

    pub fn is_open<R: Record>(&self) -> bool {
        self.connections.contains_key(&TypeId::of::<R>())
    }

    /// Drop the connection for `R`; returns whether one was open
    pub fn close<R: Record>(&mut self) -> bool {
        self.connections.remove(&TypeId::of::<R>()).is_some()
    }

    pub fn close_all(&mut self) {
        self.connections.clear();
    }

    /// Share one session cookie across every open and future connection
    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        let cookie = cookie.into();
        for connection in self.connections.values_mut() {
            connection.set_cookie(cookie.clone());
        }
        self.cookie = Some(cookie);
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

//! Per-record convenience operations
//!
//! Every [`Record`] gets the [`Entity`] methods through a blanket impl. They look
//! up the record type's connection in a [`ConnectionRegistry`] and use the
//! conventional roles: Value for data, Key for identity.

use log::info;

use crate::api::{Concurrency, ConnectionRegistry, ODataResponse};
use crate::error::Result;
use crate::mapping::{Record, Role};

/// What [`Entity::require`] did to make the remote entity match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Created,
    Updated,
    Unchanged,
}

pub trait Entity: Record {
    fn create(&self, registry: &mut ConnectionRegistry) -> Result<ODataResponse> {
        registry.connection::<Self>()?.create(self, Role::Value)
    }

    fn delete(&self, registry: &mut ConnectionRegistry) -> Result<ODataResponse> {
        registry.connection::<Self>()?.delete(self, Concurrency::Fetch)
    }

    /// Overwrite this record with the remote entity, nested lists included
    fn display(&mut self, registry: &mut ConnectionRegistry) -> Result<()> {
        registry
            .connection::<Self>()?
            .display(self, Role::Value, Role::Key, true)?;
        Ok(())
    }

    fn exists(&self, registry: &mut ConnectionRegistry) -> Result<bool> {
        registry.connection::<Self>()?.exists(self, Role::Key)
    }

    fn fetch_remote_copy(&self, registry: &mut ConnectionRegistry) -> Result<Self> {
        registry
            .connection::<Self>()?
            .fetch_remote_copy(self, Role::Value, Role::Key, true)
    }

    fn get_all(registry: &mut ConnectionRegistry) -> Result<Vec<Self>> {
        registry.connection::<Self>()?.get_all(Role::Value, false)
    }

    fn update(&self, registry: &mut ConnectionRegistry) -> Result<ODataResponse> {
        registry
            .connection::<Self>()?
            .update(self, Role::Value, Concurrency::Fetch)
    }

    /// Make the remote entity equal this record: create it when absent, update
    /// it when the remote copy differs
    fn require(&self, registry: &mut ConnectionRegistry) -> Result<Reconciliation> {
        let type_name = Self::descriptor().type_name();
        if !self.exists(registry)? {
            self.create(registry)?;
            info!("Created {}", type_name);
            return Ok(Reconciliation::Created);
        }

        let remote = self.fetch_remote_copy(registry)?;
        if remote == *self {
            return Ok(Reconciliation::Unchanged);
        }
        self.update(registry)?;
        info!("Updated {}", type_name);
        Ok(Reconciliation::Updated)
    }

    /// [`require`](Entity::require) each record in order, stopping at the first error
    fn require_all(records: &[Self], registry: &mut ConnectionRegistry) -> Result<Vec<Reconciliation>> {
        records.iter().map(|record| record.require(registry)).collect()
    }
}

impl<R: Record> Entity for R {}

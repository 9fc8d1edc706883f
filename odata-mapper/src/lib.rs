//! Declarative record mapping for OData v2 services
//!
//! Local record types describe their fields once with a static
//! [`RecordDescriptor`](mapping::RecordDescriptor). Each field carries role tags
//! (Key, SecondaryKey, Value, Expand) naming the server-side property it maps to.
//! An [`ODataConnection`](api::ODataConnection) uses those descriptors to build
//! URLs, JSON payloads and `$filter` suffixes, and to read Atom XML responses back
//! into records. It also keeps the CSRF token and session cookie that SAP gateway
//! style services require for writes.
//!
//! ```no_run
//! use odata_mapper::api::{ConnectionConfig, ConnectionRegistry};
//! use odata_mapper::entity::Entity;
//! # use odata_mapper::mapping::{FieldDescriptor, Record, RecordDescriptor, SetterResult};
//! # use once_cell::sync::Lazy;
//! # #[derive(Debug, Clone, Default, PartialEq)]
//! # struct Material { number: String }
//! # impl Record for Material {
//! #     fn descriptor() -> &'static RecordDescriptor<Self> {
//! #         static D: Lazy<RecordDescriptor<Material>> = Lazy::new(|| {
//! #             RecordDescriptor::new("Material", vec![
//! #                 FieldDescriptor::scalar("number", |m: &Material| m.number.clone().into(), set)
//! #                     .key("Matnr")
//! #                     .value("Matnr"),
//! #             ])
//! #         });
//! #         &D
//! #     }
//! # }
//! # fn set(m: &mut Material, text: &str) -> SetterResult { m.number = text.to_string(); Ok(()) }
//!
//! # fn main() -> odata_mapper::Result<()> {
//! let base = ConnectionConfig::builder()
//!     .service_root_url("https://gateway.example.com/sap/opu/odata/sap/ZMATERIAL_SRV/")
//!     .entity_name("Materials")
//!     .credentials("user", "secret")
//!     .build()?;
//! let mut registry = ConnectionRegistry::new(base)?;
//! registry.open::<Material>("Materials")?;
//!
//! let material = Material { number: "M-100".to_string() };
//! material.require(&mut registry)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod codec;
pub mod entity;
pub mod error;
pub mod mapping;

#[cfg(test)]
mod test_support;

pub use api::{Concurrency, ConnectionConfig, ConnectionRegistry, ODataConnection, ODataResponse};
pub use codec::PayloadCodec;
pub use entity::{Entity, Reconciliation};
pub use error::{DeserializationError, MappingError, ODataError, Result, SessionError};
pub use mapping::{FieldDescriptor, FieldMap, FieldValue, Record, RecordDescriptor, Role};

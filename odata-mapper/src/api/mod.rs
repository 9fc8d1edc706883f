//! OData v2 protocol layer
//!
//! Connections, sessions, URL building and the transport seam. Record mapping
//! lives in [`crate::mapping`] and payload handling in [`crate::codec`].

pub mod client;
pub mod config;
pub mod constants;
pub mod manager;
pub mod models;
pub mod operations;
pub mod query;
pub mod response;
pub mod session;
pub mod transport;

pub use client::ODataConnection;
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use manager::ConnectionRegistry;
pub use models::Credentials;
pub use operations::Operation;
pub use response::ODataResponse;
pub use session::{Concurrency, Session, SessionState};
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};

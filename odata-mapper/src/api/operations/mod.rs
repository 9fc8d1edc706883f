//! OData request operations
//!
//! Every request the connection sends is classified by an [`Operation`], which
//! fixes its HTTP method and the status code that counts as success.

pub mod operation;

pub use operation::Operation;

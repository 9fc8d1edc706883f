//! Core Operation types for OData v2 entity requests

use reqwest::Method;

/// One kind of request the connection sends to the service.
///
/// Each operation knows its HTTP method and the single status code that counts
/// as success. Any other status surfaces as a protocol error naming the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// POST a new entity to the entity set
    Create,
    /// PUT a full entity replacement by id
    Update,
    /// DELETE an entity by id
    Delete,
    /// GET one entity by id or by key filter
    Display,
    /// GET `$count` for a key filter to test existence
    Exists,
    /// GET `$count` for an arbitrary filter
    Count,
    /// GET the whole entity set
    List,
    /// GET a navigation property of one entity
    Expand,
    /// GET the service `$metadata` document
    Metadata,
    /// Harvesting GET run before a mutating request
    RefreshSession,
}

impl Operation {
    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Display
            | Self::Exists
            | Self::Count
            | Self::List
            | Self::Expand
            | Self::Metadata
            | Self::RefreshSession => Method::GET,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Display => "display",
            Self::Exists => "exists",
            Self::Count => "count",
            Self::List => "list",
            Self::Expand => "expand",
            Self::Metadata => "metadata",
            Self::RefreshSession => "GET (session refresh)",
        }
    }

    /// The only status code accepted as success
    pub fn expected_status(&self) -> u16 {
        match self {
            Self::Create => 201,
            Self::Update | Self::Delete => 204,
            _ => 200,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.operation_type())
    }
}

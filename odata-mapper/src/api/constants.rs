//! Header names, header values and URL fragments used by the OData v2 protocol

pub mod headers {
    pub const X_CSRF_TOKEN: &str = "x-csrf-token";
    pub const DATA_SERVICE_VERSION: &str = "dataserviceversion";
    pub const MAX_DATA_SERVICE_VERSION: &str = "maxdataserviceversion";
    pub const SAP_CANCEL_ON_CLOSE: &str = "sap-cancel-on-close";
    pub const SAP_MESSAGE: &str = "sap-message";

    pub const CSRF_FETCH: &str = "Fetch";
    pub const PROTOCOL_VERSION: &str = "2.0";
    pub const ACCEPT_XML: &str = "application/xml";
    pub const CHARSET_UTF8: &str = "UTF-8";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const NO_CACHE: &str = "no-cache";
}

/// Marker that identifies the session cookie among `Set-Cookie` headers
pub const DEFAULT_SESSION_COOKIE_MARKER: &str = "SAP_SESSIONID";

pub const METADATA_SEGMENT: &str = "$metadata";
pub const COUNT_SEGMENT: &str = "$count/";
pub const FILTER_PREFIX: &str = "?%24filter=";

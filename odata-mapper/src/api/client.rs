//! OData v2 connection for one entity set
//!
//! A connection owns the session (CSRF token and cookie) for its service root,
//! builds every request with the SAP gateway header set, and maps responses onto
//! records through the [`PayloadCodec`]. Status codes are checked against the
//! [`Operation`] contract; nothing is retried.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{
    ACCEPT, ACCEPT_CHARSET, CACHE_CONTROL, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName,
    HeaderValue, IF_MATCH,
};

use super::config::{ConnectionConfig, validate_entity_name};
use super::constants::headers::*;
use super::constants::{COUNT_SEGMENT, METADATA_SEGMENT};
use super::operations::Operation;
use super::query::{filter_suffix_pairs, key_predicate, parameter_suffix_pairs};
use super::response::ODataResponse;
use super::session::{Concurrency, Session, SessionState};
use super::transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};
use crate::codec::PayloadCodec;
use crate::codec::xml::XmlDocument;
use crate::error::{ODataError, Result, SessionError};
use crate::mapping::{FieldMap, ODataDateFormat, Quote, Record, Role};

pub struct ODataConnection {
    config: ConnectionConfig,
    transport: Arc<dyn Transport>,
    session: Session,
    codec: PayloadCodec,
}

impl ODataConnection {
    /// Connect over reqwest using the configured timeout
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ConnectionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let session = Session::new(config.session_cookie_marker.clone());
        let codec = PayloadCodec::new(config.dates);
        Ok(Self {
            config,
            transport,
            session,
            codec,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn codec(&self) -> &PayloadCodec {
        &self.codec
    }

    /// Change the zone in which outgoing date literals are written
    pub fn set_time_zone(&mut self, time_zone: chrono_tz::Tz) {
        self.config.dates.set_time_zone(time_zone);
        self.codec.dates_mut().set_time_zone(time_zone);
    }

    pub fn dates(&self) -> &ODataDateFormat {
        self.codec.dates()
    }

    /// Use an existing session cookie instead of the one Basic auth would yield
    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        self.session.set_cookie(cookie);
    }

    pub fn set_entity_name(&mut self, entity_name: &str) -> Result<()> {
        validate_entity_name(entity_name)?;
        self.config.entity_name = entity_name.to_string();
        Ok(())
    }

    // ---- URLs ----

    pub fn service_root_url(&self) -> &str {
        &self.config.service_root_url
    }

    /// `<root><entity>/`
    pub fn entity_root_url(&self) -> String {
        format!("{}{}/", self.config.service_root_url, self.config.entity_name)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}{}", self.config.service_root_url, METADATA_SEGMENT)
    }

    /// `<root><entity>(<keys>)/` from the record's Key fields
    pub fn entity_url_with_id<R: Record>(&self, record: &R) -> Result<String> {
        let keys = self.codec.values(record, Role::Key, Quote::Single)?;
        Ok(format!(
            "{}{}{}/",
            self.config.service_root_url,
            self.config.entity_name,
            key_predicate(&keys)
        ))
    }

    /// `$filter` suffix matching the record's `role` values
    pub fn filter_suffix<R: Record>(&self, record: &R, role: Role) -> Result<String> {
        let pairs = self.codec.values(record, role, Quote::Single)?;
        filter_suffix_pairs(&pairs)
    }

    /// `?name=value&...` suffix from the record's `role` values
    pub fn parameter_suffix<R: Record>(&self, record: &R, role: Role) -> Result<String> {
        let pairs = self.codec.values(record, role, Quote::Single)?;
        Ok(parameter_suffix_pairs(&pairs))
    }

    /// URL addressing one record: by id for Key, by filter for other roles
    fn record_url<R: Record>(&self, record: &R, key_role: Role) -> Result<String> {
        match key_role {
            Role::Key => self.entity_url_with_id(record),
            role => Ok(format!(
                "{}{}",
                self.entity_root_url(),
                self.filter_suffix(record, role)?
            )),
        }
    }

    // ---- protocol ----

    fn common_headers(&self, headers: &mut HeaderMap) {
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_XML));
        headers.insert(ACCEPT_CHARSET, HeaderValue::from_static(CHARSET_UTF8));
        headers.insert(
            HeaderName::from_static(DATA_SERVICE_VERSION),
            HeaderValue::from_static(PROTOCOL_VERSION),
        );
        headers.insert(
            HeaderName::from_static(MAX_DATA_SERVICE_VERSION),
            HeaderValue::from_static(PROTOCOL_VERSION),
        );
    }

    /// Basic auth only until a session cookie is held
    fn authorize(&self, request: &mut HttpRequest) -> Result<()> {
        match self.session.cookie() {
            Some(cookie) => {
                request.headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
            }
            None => request.basic_auth = Some(self.config.credentials.clone()),
        }
        Ok(())
    }

    /// GET `url`, harvesting the CSRF token and session cookie from the response
    pub fn get(&mut self, url: &str) -> Result<ODataResponse> {
        let raw = self.send_get(url)?;
        self.session.absorb(url, &raw.headers)?;
        Ok(ODataResponse::new(raw, url, None))
    }

    /// Like [`get`](Self::get), but a response without session headers is
    /// still returned so its status and body can be shown.
    pub fn inspect(&mut self, url: &str) -> Result<ODataResponse> {
        let raw = self.send_get(url)?;
        if let Err(e) = self.session.absorb(url, &raw.headers) {
            warn!("{}", e);
        }
        Ok(ODataResponse::new(raw, url, None))
    }

    fn send_get(&self, url: &str) -> Result<RawResponse> {
        let mut request = HttpRequest::new(Method::GET, url);
        self.common_headers(&mut request.headers);
        request.headers.insert(
            HeaderName::from_static(X_CSRF_TOKEN),
            HeaderValue::from_static(CSRF_FETCH),
        );
        self.authorize(&mut request)?;

        debug!("GET {}", url);
        self.transport.execute(&request)
    }

    /// Make sure a CSRF token and cookie are held, returning the etag to send.
    ///
    /// Unless `concurrency` is [`Concurrency::Skip`], the harvesting GET goes to
    /// `target_url` so the etag of the addressed entity comes back with it.
    pub fn ensure_fresh(
        &mut self,
        target_url: &str,
        concurrency: &Concurrency,
    ) -> Result<Option<String>> {
        let known_etag = match concurrency {
            Concurrency::Known(etag) => Some(etag.clone()),
            _ => None,
        };
        let needs_etag = *concurrency != Concurrency::Skip;
        self.refresh_session(target_url, needs_etag, known_etag, None)
    }

    fn refresh_session(
        &mut self,
        target_url: &str,
        needs_etag: bool,
        known_etag: Option<String>,
        payload: Option<&str>,
    ) -> Result<Option<String>> {
        let mut etag = known_etag;
        if self.session.needs_refresh(needs_etag, etag.is_some()) {
            let refresh_url = if needs_etag {
                target_url.to_string()
            } else {
                self.config.service_root_url.clone()
            };
            debug!("Refreshing session tokens via {}", refresh_url);

            let response = self.get(&refresh_url)?;
            if needs_etag {
                etag = response.etag().map(str::to_string);
            }
            if response.status_code() != Operation::RefreshSession.expected_status() {
                warn!("Session refresh GET {} returned {}", refresh_url, response.status_line());
                return Err(ODataError::Protocol {
                    operation: Operation::RefreshSession.operation_type(),
                    status: response.status_code(),
                    message: response.error_message(),
                    url: refresh_url,
                    payload: payload.map(str::to_string),
                });
            }
        }

        if needs_etag && etag.is_none() {
            return Err(SessionError::MissingEtag {
                message: "no etag header on the entity".to_string(),
                url: target_url.to_string(),
                payload: payload.map(str::to_string),
            }
            .into());
        }

        Ok(if needs_etag { etag } else { None })
    }

    /// Send a mutating request; POST never carries `If-Match`
    pub fn mutate(
        &mut self,
        url: &str,
        method: Method,
        payload: Option<String>,
        concurrency: Concurrency,
    ) -> Result<ODataResponse> {
        let needs_etag = method != Method::POST && concurrency != Concurrency::Skip;
        let known_etag = match concurrency {
            Concurrency::Known(etag) => Some(etag),
            _ => None,
        };
        let etag = self.refresh_session(url, needs_etag, known_etag, payload.as_deref())?;

        let mut request = HttpRequest::new(method.clone(), url);
        self.common_headers(&mut request.headers);
        let headers = &mut request.headers;
        headers.insert(
            HeaderName::from_static(SAP_CANCEL_ON_CLOSE),
            HeaderValue::from_static("true"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        if let Some(token) = self.session.csrf_token() {
            headers.insert(HeaderName::from_static(X_CSRF_TOKEN), HeaderValue::from_str(token)?);
        }
        if let Some(etag) = &etag {
            headers.insert(IF_MATCH, HeaderValue::from_str(etag)?);
        }
        if let Some(payload) = &payload {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            request.body = Some(payload.as_bytes().to_vec());
        }
        self.authorize(&mut request)?;

        debug!("{} {}", method, url);
        let raw = self.transport.execute(&request)?;
        Ok(ODataResponse::new(raw, url, payload))
    }

    /// Number of entities matching `filter_suffix` (may be empty for all)
    pub fn count(&mut self, filter_suffix: &str) -> Result<u64> {
        let url = format!("{}{}{}", self.entity_root_url(), COUNT_SEGMENT, filter_suffix);
        let response = self.get(&url)?;
        expect_status(&response, Operation::Count)?;

        let body = response.text()?.trim();
        body.parse().map_err(|_| ODataError::InvalidCount {
            url: url.clone(),
            body: body.to_string(),
        })
    }

    // ---- entity operations ----

    /// POST the record's `role` values; the response `Location` names the new entity
    pub fn create<R: Record>(&mut self, record: &R, role: Role) -> Result<ODataResponse> {
        let url = self.entity_root_url();
        let payload = self.codec.to_wire(record, role)?;
        let response = self.mutate(&url, Operation::Create.http_method(), Some(payload), Concurrency::Fetch)?;
        expect_status(&response, Operation::Create)?;
        Ok(response)
    }

    /// PUT the record's `role` values over the entity with the same Key
    pub fn update<R: Record>(
        &mut self,
        record: &R,
        role: Role,
        concurrency: Concurrency,
    ) -> Result<ODataResponse> {
        let url = self.entity_url_with_id(record)?;
        let payload = self.codec.to_wire(record, role)?;
        let response = self.mutate(&url, Operation::Update.http_method(), Some(payload), concurrency)?;
        expect_status(&response, Operation::Update)?;
        Ok(response)
    }

    pub fn delete<R: Record>(&mut self, record: &R, concurrency: Concurrency) -> Result<ODataResponse> {
        let url = self.entity_url_with_id(record)?;
        let response = self.mutate(&url, Operation::Delete.http_method(), None, concurrency)?;
        expect_status(&response, Operation::Delete)?;
        Ok(response)
    }

    /// Fetch the entity identified by `key_role` and apply its `role` values onto
    /// `record`; with `expand`, every Expand field is fetched as well
    pub fn display<R: Record>(
        &mut self,
        record: &mut R,
        role: Role,
        key_role: Role,
        expand: bool,
    ) -> Result<ODataResponse> {
        let url = self.record_url(record, key_role)?;
        let response = self.get(&url)?;
        expect_status(&response, Operation::Display)?;

        let document = response.document()?;
        self.codec
            .from_xml_single(record, document, role)
            .map_err(|err| err.with_request_url(&url))?;

        if expand {
            self.expand_all(record, role)?;
        }
        Ok(response)
    }

    /// Populate every Expand field of `record`; records without any are left alone
    pub fn expand_all<R: Record>(&mut self, record: &mut R, role: Role) -> Result<()> {
        if !R::descriptor().has_role(Role::Expand) {
            return Ok(());
        }
        let links = FieldMap::<R>::expand_links()?;
        let base = self.entity_url_with_id(record)?;

        for entry in links.entries() {
            let url = format!("{}{}", base, entry.wire_name());
            let response = self.get(&url)?;
            expect_status(&response, Operation::Expand)?;
            let document = response.document()?;

            if let Some(link) = entry.link() {
                let count = link
                    .populate(record, document, role)
                    .map_err(|err| err.with_request_url(&url))?;
                debug!("Expanded {} with {} {} records", entry.wire_name(), count, link.target_type());
            }
        }
        Ok(())
    }

    /// Records of type `C` behind the navigation property `suffix` of `parent`
    pub fn expand_list<R: Record, C: Record>(
        &mut self,
        parent: &R,
        suffix: &str,
        role: Role,
    ) -> Result<Vec<C>> {
        let url = format!("{}{}", self.entity_url_with_id(parent)?, suffix);
        self.fetch_list(&url, Operation::Expand, role)
    }

    pub fn exists<R: Record>(&mut self, record: &R, key_role: Role) -> Result<bool> {
        let suffix = self.filter_suffix(record, key_role)?;
        let url = format!("{}{}{}", self.entity_root_url(), COUNT_SEGMENT, suffix);
        let response = self.get(&url)?;
        expect_status(&response, Operation::Exists)?;

        let body = response.text()?.trim();
        let count: u64 = body.parse().map_err(|_| ODataError::InvalidCount {
            url: url.clone(),
            body: body.to_string(),
        })?;
        Ok(count > 0)
    }

    /// A new record with only the `key_role` values of `record`, then displayed.
    /// `record` itself is not modified.
    pub fn fetch_remote_copy<R: Record>(
        &mut self,
        record: &R,
        role: Role,
        key_role: Role,
        expand: bool,
    ) -> Result<R> {
        let mut copy = self.codec.copy_keys(record, key_role)?;
        self.display(&mut copy, role, key_role, expand)?;
        Ok(copy)
    }

    pub fn get_all<R: Record>(&mut self, role: Role, expand: bool) -> Result<Vec<R>> {
        let url = self.entity_root_url();
        let mut records: Vec<R> = self.fetch_list(&url, Operation::List, role)?;
        if expand {
            for record in &mut records {
                self.expand_all(record, role)?;
            }
        }
        Ok(records)
    }

    /// Raw `$metadata` document
    pub fn fetch_metadata(&mut self) -> Result<String> {
        let url = self.metadata_url();
        let response = self.get(&url)?;
        expect_status(&response, Operation::Metadata)?;
        Ok(response.text()?.to_string())
    }

    fn fetch_list<C: Record>(&mut self, url: &str, operation: Operation, role: Role) -> Result<Vec<C>> {
        let response = self.get(url)?;
        expect_status(&response, operation)?;
        let document: &XmlDocument = response.document()?;
        self.codec
            .from_xml_document(document, role)
            .map_err(|err| err.with_request_url(url))
    }
}

impl std::fmt::Debug for ODataConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataConnection")
            .field("config", &self.config)
            .field("session", &self.session.state())
            .finish()
    }
}

fn expect_status(response: &ODataResponse, operation: Operation) -> Result<()> {
    if response.status_code() == operation.expected_status() {
        return Ok(());
    }
    warn!(
        "{} {} returned {} (expected {})",
        operation,
        response.request_url(),
        response.status_line(),
        operation.expected_status()
    );
    Err(ODataError::Protocol {
        operation: operation.operation_type(),
        status: response.status_code(),
        message: response.error_message(),
        url: response.request_url().to_string(),
        payload: response.request_payload().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeserializationError, MappingError};
    use crate::test_support::{
        Person, SERVICE_ROOT, Task, connection, error_body, feed, person, person_entry,
        response, session_response, single, task_entry,
    };
    use reqwest::StatusCode;

    fn url(path: &str) -> String {
        format!("{}{}", SERVICE_ROOT, path)
    }

    #[test]
    fn test_urls() {
        let (connection, _) = connection("People", Vec::<RawResponse>::new());
        assert_eq!(connection.entity_root_url(), url("People/"));
        assert_eq!(connection.metadata_url(), url("$metadata"));
        assert_eq!(connection.entity_url_with_id(&person()).unwrap(), url("People(7)/"));
        assert_eq!(
            connection.filter_suffix(&person(), Role::SecondaryKey).unwrap(),
            "?%24filter=Nickname%20eq%20%27H%27"
        );
        assert_eq!(
            connection.parameter_suffix(&person(), Role::Key).unwrap(),
            "?ID=7"
        );
    }

    #[test]
    fn test_get_activates_session() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::OK, "")]);
        assert_eq!(connection.session_state(), SessionState::Uninitialized);

        connection.get(&url("People/")).unwrap();
        assert_eq!(connection.session_state(), SessionState::Active);

        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.header("x-csrf-token"), Some("Fetch"));
        assert_eq!(request.header("accept"), Some("application/xml"));
        assert_eq!(request.header("accept-charset"), Some("UTF-8"));
        assert_eq!(request.header("dataserviceversion"), Some("2.0"));
        assert_eq!(request.header("maxdataserviceversion"), Some("2.0"));
        assert!(request.basic_auth.is_some());
        assert!(request.header("cookie").is_none());
    }

    #[test]
    fn test_get_without_token_fails() {
        let (mut connection, _) = connection("People", [response(StatusCode::OK, "")]);
        let err = connection.get(&url("People/")).unwrap_err();
        assert!(matches!(
            err,
            ODataError::Session(SessionError::MissingCsrfToken { .. })
        ));
    }

    #[test]
    fn test_inspect_returns_error_response_without_token() {
        let (mut connection, _) = connection(
            "People",
            [response(StatusCode::NOT_FOUND, &error_body("Resource not found"))],
        );
        let response = connection.inspect(&url("Nobody/")).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.server_message().as_deref(), Some("Resource not found"));
        assert_eq!(connection.session_state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_inspect_activates_session() {
        let (mut connection, _) =
            connection("People", [session_response(StatusCode::OK, "")]);
        connection.inspect(&url("People/")).unwrap();
        assert_eq!(connection.session_state(), SessionState::Active);
    }

    #[test]
    fn test_ensure_fresh_runs_once() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::OK, "")]);

        assert_eq!(connection.ensure_fresh(&url("People/"), &Concurrency::Skip).unwrap(), None);
        assert_eq!(transport.requests().len(), 1);
        // root is used when no etag is needed
        assert_eq!(transport.requests()[0].url, SERVICE_ROOT);

        assert_eq!(connection.ensure_fresh(&url("People/"), &Concurrency::Skip).unwrap(), None);
        assert_eq!(transport.requests().len(), 1);

        // a known etag on a warm session needs no GET either
        let etag = connection
            .ensure_fresh(&url("People(7)/"), &Concurrency::Known("W/\"3\"".to_string()))
            .unwrap();
        assert_eq!(etag.as_deref(), Some("W/\"3\""));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_ensure_fresh_fetches_etag_from_target() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::OK, "")]);
        let etag = connection
            .ensure_fresh(&url("People(7)/"), &Concurrency::Fetch)
            .unwrap();
        assert_eq!(etag.as_deref(), Some("W/\"datetimeoffset'1'\""));
        assert_eq!(transport.requests()[0].url, url("People(7)/"));
    }

    #[test]
    fn test_create_carries_session_headers() {
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, ""),
                response(StatusCode::CREATED, "")
                    .with_header(reqwest::header::LOCATION, url("People(7)").parse().unwrap()),
            ],
        );
        let task = Task {
            id: 3,
            title: "Plan".to_string(),
        };
        let response = connection.create(&task, Role::Value).unwrap();
        assert_eq!(response.location(), Some(url("People(7)").as_str()));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, SERVICE_ROOT);

        let post = &requests[1];
        assert_eq!(post.method, Method::POST);
        assert_eq!(post.url, url("People/"));
        assert_eq!(post.header("x-csrf-token"), Some("abc123"));
        assert_eq!(post.header("cookie"), Some("SAP_SESSIONID=xyz; Path=/"));
        assert_eq!(post.header("sap-cancel-on-close"), Some("true"));
        assert_eq!(post.header("cache-control"), Some("no-cache"));
        assert_eq!(post.header("content-type"), Some("application/json"));
        assert!(post.header("if-match").is_none());
        assert!(post.basic_auth.is_none());
        assert_eq!(post.body_text().as_deref(), Some(r#"{"TaskID":3,"Title":"Plan"}"#));
    }

    #[test]
    fn test_update_attaches_etag() {
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, ""),
                response(StatusCode::NO_CONTENT, ""),
            ],
        );
        let mut record = person();
        record.tasks.clear();
        connection.update(&record, Role::Value, Concurrency::Fetch).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, url("People(7)/"));
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].header("if-match"), Some("W/\"datetimeoffset'1'\""));
    }

    #[test]
    fn test_update_with_known_etag_on_warm_session() {
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, ""),
                response(StatusCode::NO_CONTENT, ""),
            ],
        );
        connection.get(SERVICE_ROOT).unwrap();

        let task = Task::default();
        connection
            .update(&task, Role::Value, Concurrency::Known("W/\"7\"".to_string()))
            .unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].header("if-match"), Some("W/\"7\""));
    }

    #[test]
    fn test_skip_sends_no_if_match() {
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, ""),
                response(StatusCode::NO_CONTENT, ""),
            ],
        );
        connection.delete(&Task::default(), Concurrency::Skip).unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].url, SERVICE_ROOT);
        assert_eq!(requests[1].method, Method::DELETE);
        assert!(requests[1].header("if-match").is_none());
        assert!(requests[1].body.is_none());
    }

    #[test]
    fn test_failed_refresh_never_sends_mutation() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::NOT_FOUND, "")]);
        let err = connection
            .mutate(&url("People(7)/"), Method::PUT, Some("{}".to_string()), Concurrency::Fetch)
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404 Not Found"));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
    }

    #[test]
    fn test_missing_etag() {
        let (mut connection, _) = connection(
            "People",
            [response(StatusCode::OK, "")
                .with_header(HeaderName::from_static("x-csrf-token"), HeaderValue::from_static("t"))
                .with_header(
                    reqwest::header::SET_COOKIE,
                    HeaderValue::from_static("SAP_SESSIONID=1"),
                )],
        );
        let err = connection
            .mutate(&url("People(7)/"), Method::DELETE, None, Concurrency::Fetch)
            .unwrap_err();
        assert!(matches!(
            err,
            ODataError::Session(SessionError::MissingEtag { .. })
        ));
    }

    #[test]
    fn test_unexpected_status_is_protocol_error() {
        let (mut connection, _) = connection(
            "People",
            [
                session_response(StatusCode::OK, ""),
                response(StatusCode::BAD_REQUEST, &error_body("Property Foo invalid")),
            ],
        );
        let err = connection.create(&Task::default(), Role::Value).unwrap_err();
        match err {
            ODataError::Protocol {
                operation,
                status,
                message,
                url: request_url,
                payload,
            } => {
                assert_eq!(operation, "create");
                assert_eq!(status, 400);
                assert_eq!(message, "400 Bad Request: Property Foo invalid");
                assert_eq!(request_url, url("People/"));
                assert_eq!(payload.as_deref(), Some(r#"{"TaskID":0,"Title":""}"#));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_count() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::OK, "42\n")]);
        assert_eq!(connection.count("?$filter=ID eq 5").unwrap(), 42);
        assert_eq!(transport.requests()[0].url, url("People/$count/?$filter=ID eq 5"));
    }

    #[test]
    fn test_count_server_error() {
        let (mut connection, _) = connection(
            "People",
            [session_response(StatusCode::INTERNAL_SERVER_ERROR, &error_body("boom"))],
        );
        let err = connection.count("").unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_count_not_a_number() {
        let (mut connection, _) = connection("People", [session_response(StatusCode::OK, "many")]);
        assert!(matches!(
            connection.count(""),
            Err(ODataError::InvalidCount { .. })
        ));
    }

    #[test]
    fn test_exists() {
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, "1"),
                session_response(StatusCode::OK, "0"),
            ],
        );
        assert!(connection.exists(&person(), Role::Key).unwrap());
        assert!(!connection.exists(&person(), Role::SecondaryKey).unwrap());

        let requests = transport.requests();
        assert_eq!(requests[0].url, url("People/$count/?%24filter=ID%20eq%207"));
        assert_eq!(
            requests[1].url,
            url("People/$count/?%24filter=Nickname%20eq%20%27H%27")
        );
        // second GET sends the cookie instead of credentials
        assert!(requests[1].basic_auth.is_none());
        assert!(requests[1].header("cookie").is_some());
    }

    #[test]
    fn test_display_with_expand() {
        let remote = person();
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, &single(&person_entry(&remote))),
                session_response(
                    StatusCode::OK,
                    &feed(&[task_entry(1, "Plan"), task_entry(2, "Ship")]),
                ),
            ],
        );

        let mut record = Person {
            id: 7,
            ..Person::default()
        };
        connection.display(&mut record, Role::Value, Role::Key, true).unwrap();
        assert_eq!(record, remote);

        let requests = transport.requests();
        assert_eq!(requests[0].url, url("People(7)/"));
        assert_eq!(requests[1].url, url("People(7)/Tasks"));
    }

    #[test]
    fn test_display_by_secondary_key_without_expand() {
        let remote = person();
        let (mut connection, transport) = connection(
            "People",
            [session_response(StatusCode::OK, &feed(&[person_entry(&remote)]))],
        );
        let mut record = Person {
            nickname: Some("H".to_string()),
            ..Person::default()
        };
        connection
            .display(&mut record, Role::Value, Role::SecondaryKey, false)
            .unwrap();
        assert_eq!(record.id, 7);
        assert!(record.tasks.is_empty());
        assert_eq!(
            transport.requests()[0].url,
            url("People/?%24filter=Nickname%20eq%20%27H%27")
        );
    }

    #[test]
    fn test_display_requires_one_entry() {
        let (mut connection, _) =
            connection("People", [session_response(StatusCode::OK, &feed(&[]))]);
        let err = connection
            .display(&mut person(), Role::Value, Role::Key, false)
            .unwrap_err();
        assert!(matches!(
            err,
            ODataError::Mapping(MappingError::EntryCount { actual: 0 })
        ));
    }

    #[test]
    fn test_display_missing_property_names_url_and_type() {
        let (mut connection, _) = connection(
            "People",
            [session_response(StatusCode::OK, &single(&task_entry(1, "x")))],
        );
        let err = connection
            .display(&mut person(), Role::Value, Role::Key, false)
            .unwrap_err();
        match err {
            ODataError::Deserialization(err) => {
                let expected = DeserializationError::new("ID")
                    .with_local_type("Person")
                    .with_url(url("People(7)/"));
                assert_eq!(err, expected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_remote_copy_leaves_record_untouched() {
        let remote = person();
        let (mut connection, _) = connection(
            "People",
            [session_response(StatusCode::OK, &single(&person_entry(&remote)))],
        );
        let local = Person {
            id: 7,
            name: "local".to_string(),
            ..Person::default()
        };
        let copy = connection
            .fetch_remote_copy(&local, Role::Value, Role::Key, false)
            .unwrap();
        assert_eq!(copy.name, "Harlan");
        assert_eq!(local.name, "local");
    }

    #[test]
    fn test_get_all_and_expand_list() {
        let (mut connection, transport) = connection(
            "Tasks",
            [
                session_response(StatusCode::OK, &feed(&[task_entry(1, "a"), task_entry(2, "b")])),
                session_response(StatusCode::OK, &feed(&[task_entry(3, "c")])),
            ],
        );
        let all: Vec<Task> = connection.get_all(Role::Value, false).unwrap();
        assert_eq!(all.len(), 2);

        let children: Vec<Task> = connection.expand_list(&all[0], "Subtasks", Role::Value).unwrap();
        assert_eq!(children[0].title, "c");
        assert_eq!(transport.requests()[1].url, url("Tasks(1)/Subtasks"));
    }

    #[test]
    fn test_get_all_with_expand() {
        let remote = person();
        let (mut connection, transport) = connection(
            "People",
            [
                session_response(StatusCode::OK, &feed(&[person_entry(&remote)])),
                session_response(StatusCode::OK, &feed(&[task_entry(1, "Plan")])),
            ],
        );
        let all: Vec<Person> = connection.get_all(Role::Value, true).unwrap();
        assert_eq!(all[0].tasks.len(), 1);
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_fetch_metadata() {
        let (mut connection, transport) = connection(
            "People",
            [session_response(StatusCode::OK, "<edmx:Edmx Version=\"1.0\"/>")],
        );
        let metadata = connection.fetch_metadata().unwrap();
        assert!(metadata.starts_with("<edmx:Edmx"));
        assert_eq!(transport.requests()[0].url, url("$metadata"));
    }

    #[test]
    fn test_set_cookie_skips_basic_auth() {
        let (mut connection, transport) =
            connection("People", [session_response(StatusCode::OK, "")]);
        connection.set_cookie("SAP_SESSIONID=shared");
        connection.get(SERVICE_ROOT).unwrap();
        let request = &transport.requests()[0];
        assert!(request.basic_auth.is_none());
        assert_eq!(request.header("cookie"), Some("SAP_SESSIONID=shared"));
    }

    #[test]
    fn test_set_entity_name() {
        let (mut connection, _) = connection("People", Vec::<RawResponse>::new());
        connection.set_entity_name("Tasks").unwrap();
        assert_eq!(connection.entity_root_url(), url("Tasks/"));
        assert!(connection.set_entity_name("Tasks/").is_err());
    }
}

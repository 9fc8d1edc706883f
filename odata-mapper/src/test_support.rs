//! Shared fixtures for unit tests: sample records, Atom builders and a scripted transport

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use reqwest::header::{ETAG, HeaderName, HeaderValue, SET_COOKIE};

use crate::api::{ConnectionConfig, HttpRequest, ODataConnection, RawResponse, Transport};
use crate::error::{ODataError, Result};
use crate::mapping::{FieldDescriptor, Record, RecordDescriptor, SetterResult, parse_datetime};

pub const SERVICE_ROOT: &str = "https://example.com/sap/opu/odata/sap/ZPEOPLE_SRV/";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
}

impl Record for Task {
    fn descriptor() -> &'static RecordDescriptor<Self> {
        static DESCRIPTOR: Lazy<RecordDescriptor<Task>> = Lazy::new(|| {
            RecordDescriptor::new(
                "Task",
                vec![
                    FieldDescriptor::scalar("id", |t: &Task| t.id.into(), set_task_id)
                        .key("TaskID")
                        .value("TaskID"),
                    FieldDescriptor::scalar("title", |t: &Task| t.title.clone().into(), set_title)
                        .value("Title"),
                ],
            )
        });
        &DESCRIPTOR
    }
}

fn set_task_id(task: &mut Task, text: &str) -> SetterResult {
    task.id = text.parse()?;
    Ok(())
}

fn set_title(task: &mut Task, text: &str) -> SetterResult {
    task.title = text.to_string();
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub nickname: Option<String>,
    pub born: DateTime<Utc>,
    pub active: bool,
    pub score: f64,
    pub grade: char,
    pub tasks: Vec<Task>,
}

impl Record for Person {
    fn descriptor() -> &'static RecordDescriptor<Self> {
        static DESCRIPTOR: Lazy<RecordDescriptor<Person>> = Lazy::new(|| {
            RecordDescriptor::new(
                "Person",
                vec![
                    FieldDescriptor::scalar("id", |p: &Person| p.id.into(), set_id)
                        .key("ID")
                        .value("ID"),
                    FieldDescriptor::scalar("name", |p: &Person| p.name.clone().into(), set_name)
                        .value("Name"),
                    FieldDescriptor::scalar(
                        "nickname",
                        |p: &Person| p.nickname.clone().into(),
                        set_nickname,
                    )
                    .secondary_key("Nickname")
                    .value("Nickname"),
                    FieldDescriptor::scalar("born", |p: &Person| p.born.into(), set_born)
                        .value("Born"),
                    FieldDescriptor::scalar("active", |p: &Person| p.active.into(), set_active)
                        .value("Active"),
                    FieldDescriptor::scalar("score", |p: &Person| p.score.into(), set_score)
                        .value("Score"),
                    FieldDescriptor::scalar("grade", |p: &Person| p.grade.into(), set_grade)
                        .value("Grade"),
                    FieldDescriptor::list("tasks", tasks, set_tasks)
                        .expand("Tasks")
                        .value("Tasks"),
                ],
            )
        });
        &DESCRIPTOR
    }
}

fn set_id(person: &mut Person, text: &str) -> SetterResult {
    person.id = text.parse()?;
    Ok(())
}

fn set_name(person: &mut Person, text: &str) -> SetterResult {
    person.name = text.to_string();
    Ok(())
}

fn set_nickname(person: &mut Person, text: &str) -> SetterResult {
    person.nickname = Some(text.to_string());
    Ok(())
}

fn set_born(person: &mut Person, text: &str) -> SetterResult {
    person.born = parse_datetime(text)?;
    Ok(())
}

fn set_active(person: &mut Person, text: &str) -> SetterResult {
    person.active = text.parse()?;
    Ok(())
}

fn set_score(person: &mut Person, text: &str) -> SetterResult {
    person.score = text.parse()?;
    Ok(())
}

fn set_grade(person: &mut Person, text: &str) -> SetterResult {
    person.grade = text.chars().next().ok_or("empty grade")?;
    Ok(())
}

fn tasks(person: &Person) -> &[Task] {
    &person.tasks
}

fn set_tasks(person: &mut Person, tasks: Vec<Task>) {
    person.tasks = tasks;
}

pub fn person() -> Person {
    Person {
        id: 7,
        name: "Harlan".to_string(),
        nickname: Some("H".to_string()),
        born: Utc.with_ymd_and_hms(2020, 5, 1, 8, 30, 0).unwrap(),
        active: true,
        score: 2.5,
        grade: 'A',
        tasks: vec![
            Task {
                id: 1,
                title: "Plan".to_string(),
            },
            Task {
                id: 2,
                title: "Ship".to_string(),
            },
        ],
    }
}

/// An Atom feed wrapping the given entries
pub fn feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">
<title type="text">Set</title>
{}
</feed>"#,
        entries.join("\n")
    )
}

/// A single-entry document whose root element is the entry itself
pub fn single(entry: &str) -> String {
    entry.replacen(
        "<entry>",
        r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">"#,
        1,
    )
}

pub fn entry(properties: &[(&str, &str)]) -> String {
    let properties: String = properties
        .iter()
        .map(|(name, text)| format!("<d:{name}>{text}</d:{name}>"))
        .collect();
    format!(
        r#"<entry><id>x</id><content type="application/xml"><m:properties>{properties}</m:properties></content></entry>"#
    )
}

pub fn task_entry(id: i64, title: &str) -> String {
    entry(&[("TaskID", &id.to_string()), ("Title", title)])
}

pub fn person_entry(person: &Person) -> String {
    entry(&[
        ("ID", &person.id.to_string()),
        ("Name", &person.name),
        ("Nickname", person.nickname.as_deref().unwrap_or_default()),
        ("Born", &person.born.format("%Y-%m-%dT%H:%M:%S").to_string()),
        ("Active", &person.active.to_string()),
        ("Score", &person.score.to_string()),
        ("Grade", &person.grade.to_string()),
    ])
}

pub fn error_body(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><error xmlns="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"><code>SY/530</code><message xml:lang="en">{message}</message></error>"#
    )
}

pub fn response(status: StatusCode, body: &str) -> RawResponse {
    RawResponse::new(status, SERVICE_ROOT).with_body(body)
}

/// A response that hands out a CSRF token, a session cookie and an etag
pub fn session_response(status: StatusCode, body: &str) -> RawResponse {
    response(status, body)
        .with_header(
            HeaderName::from_static("x-csrf-token"),
            HeaderValue::from_static("abc123"),
        )
        .with_header(SET_COOKIE, HeaderValue::from_static("sap-usercontext=sap-client=100; path=/"))
        .with_header(SET_COOKIE, HeaderValue::from_static("SAP_SESSIONID=xyz; Path=/"))
        .with_header(ETAG, HeaderValue::from_static("W/\"datetimeoffset'1'\""))
}

/// Transport replaying scripted responses in order and recording every request
pub struct MockTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(responses: impl IntoIterator<Item = RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Vec::<RawResponse>::new())
    }

    pub fn push(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ODataError::Transport {
                url: request.url.clone(),
                reason: "no scripted response left".to_string(),
            })
    }
}

pub fn config(entity_name: &str) -> ConnectionConfig {
    ConnectionConfig::builder()
        .service_root_url(SERVICE_ROOT)
        .entity_name(entity_name)
        .credentials("user", "secret")
        .build()
        .unwrap()
}

pub fn connection(
    entity_name: &str,
    responses: impl IntoIterator<Item = RawResponse>,
) -> (ODataConnection, Arc<MockTransport>) {
    let transport = MockTransport::new(responses);
    let connection = ODataConnection::with_transport(config(entity_name), transport.clone())
        .unwrap();
    (connection, transport)
}

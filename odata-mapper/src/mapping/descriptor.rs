//! Static record descriptors: which fields map to which wire properties.
//!
//! A record type declares its fields once, each with one or more role tags and
//! the accessors the codec uses to read and write it. Descriptors are built
//! lazily and cached for the life of the process.
//!
//! ```ignore
//! impl Record for Person {
//!     fn descriptor() -> &'static RecordDescriptor<Self> {
//!         static DESCRIPTOR: Lazy<RecordDescriptor<Person>> = Lazy::new(|| {
//!             RecordDescriptor::new("Person", vec![
//!                 FieldDescriptor::scalar("id", |p: &Person| p.id.into(), set_id)
//!                     .key("ID")
//!                     .value("ID"),
//!                 FieldDescriptor::list("tasks", tasks, set_tasks).expand("Tasks"),
//!             ])
//!         });
//!         &DESCRIPTOR
//!     }
//! }
//! ```

use std::fmt;

use crate::codec::xml::XmlDocument;
use crate::error::{BoxError, Result};

use super::date::ODataDateFormat;
use super::value::FieldValue;

/// Role a field plays in the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Primary key, used in `Entity(key)` URLs
    Key,
    /// Alternate identity, used in `$filter` lookups
    SecondaryKey,
    /// Data property written on create/update and read on display
    Value,
    /// Navigation property holding a list of nested records
    Expand,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Key => "Key",
            Role::SecondaryKey => "SecondaryKey",
            Role::Value => "Value",
            Role::Expand => "Expand",
        };
        f.write_str(name)
    }
}

/// Accessor a caller needs from every field of a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    StringSetter,
    ListSetter,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessorKind::Getter => "getter",
            AccessorKind::StringSetter => "string setter",
            AccessorKind::ListSetter => "list setter",
        };
        f.write_str(name)
    }
}

/// One `(role, wire name, sort order)` tag on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTag {
    pub role: Role,
    pub wire_name: &'static str,
    pub order: i32,
}

pub type SetterResult = std::result::Result<(), BoxError>;
pub type Getter<R> = fn(&R) -> FieldValue;
pub type Setter<R> = fn(&mut R, &str) -> SetterResult;

/// A local type mapped onto a remote entity.
///
/// `PartialEq` is the identity used to decide whether a remote copy has drifted.
pub trait Record: Default + Clone + PartialEq + Send + Sync + 'static {
    fn descriptor() -> &'static RecordDescriptor<Self>;
}

/// All mapped fields of one record type, in declaration order
pub struct RecordDescriptor<R: 'static> {
    type_name: &'static str,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R: 'static> RecordDescriptor<R> {
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor<R>>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.fields.iter().any(|field| field.has_role(role))
    }
}

impl<R: 'static> fmt::Debug for RecordDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// One field: its local name, role tags and accessors
pub struct FieldDescriptor<R: 'static> {
    name: &'static str,
    tags: Vec<RoleTag>,
    access: FieldAccess<R>,
}

pub enum FieldAccess<R: 'static> {
    Scalar {
        get: Getter<R>,
        set: Option<Setter<R>>,
    },
    List(Box<dyn ExpandLink<R>>),
}

impl<R: Record> FieldDescriptor<R> {
    /// A scalar field read through `get` and written from wire text through `set`
    pub fn scalar(name: &'static str, get: Getter<R>, set: Setter<R>) -> Self {
        Self {
            name,
            tags: Vec::new(),
            access: FieldAccess::Scalar { get, set: Some(set) },
        }
    }

    /// A scalar field that is only ever rendered, never populated from the server
    pub fn read_only(name: &'static str, get: Getter<R>) -> Self {
        Self {
            name,
            tags: Vec::new(),
            access: FieldAccess::Scalar { get, set: None },
        }
    }

    /// A list of nested records, filled from a navigation property
    pub fn list<T: Record>(
        name: &'static str,
        get: fn(&R) -> &[T],
        set: fn(&mut R, Vec<T>),
    ) -> Self {
        Self {
            name,
            tags: Vec::new(),
            access: FieldAccess::List(Box::new(ListLink { get, set })),
        }
    }

    pub fn key(self, wire_name: &'static str) -> Self {
        self.tag(Role::Key, wire_name, 0)
    }

    pub fn secondary_key(self, wire_name: &'static str) -> Self {
        self.tag(Role::SecondaryKey, wire_name, 0)
    }

    pub fn value(self, wire_name: &'static str) -> Self {
        self.tag(Role::Value, wire_name, 0)
    }

    pub fn expand(self, wire_name: &'static str) -> Self {
        self.tag(Role::Expand, wire_name, 0)
    }

    /// Tag with an explicit sort order; lower orders render first
    pub fn tag(mut self, role: Role, wire_name: &'static str, order: i32) -> Self {
        self.tags.push(RoleTag {
            role,
            wire_name,
            order,
        });
        self
    }
}

impl<R: 'static> FieldDescriptor<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> &[RoleTag] {
        &self.tags
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.tags.iter().any(|tag| tag.role == role)
    }

    pub fn access(&self) -> &FieldAccess<R> {
        &self.access
    }

    pub fn supports(&self, accessor: AccessorKind) -> bool {
        match (&self.access, accessor) {
            (_, AccessorKind::Getter) => true,
            (FieldAccess::Scalar { set, .. }, AccessorKind::StringSetter) => set.is_some(),
            (FieldAccess::List(_), AccessorKind::ListSetter) => true,
            _ => false,
        }
    }
}

impl<R: 'static> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match &self.access {
            FieldAccess::Scalar { set: Some(_), .. } => "scalar".to_string(),
            FieldAccess::Scalar { set: None, .. } => "read-only scalar".to_string(),
            FieldAccess::List(link) => format!("list of {}", link.target_type()),
        };
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("access", &access)
            .finish()
    }
}

/// Navigation from a record to a list of nested records
pub trait ExpandLink<R>: Send + Sync {
    /// Type name of the nested record
    fn target_type(&self) -> &'static str;

    /// Render the current list as JSON objects using `role` for each element
    fn value(&self, record: &R, role: Role, dates: &ODataDateFormat) -> Result<FieldValue>;

    /// Replace the list with every entry of `document`; returns the entry count
    fn populate(&self, record: &mut R, document: &XmlDocument, role: Role) -> Result<usize>;
}

struct ListLink<R, T> {
    get: fn(&R) -> &[T],
    set: fn(&mut R, Vec<T>),
}

impl<R: 'static, T: Record> ExpandLink<R> for ListLink<R, T> {
    fn target_type(&self) -> &'static str {
        T::descriptor().type_name()
    }

    fn value(&self, record: &R, role: Role, dates: &ODataDateFormat) -> Result<FieldValue> {
        let objects = (self.get)(record)
            .iter()
            .map(|item| crate::codec::json::object(item, role, dates))
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldValue::List(objects))
    }

    fn populate(&self, record: &mut R, document: &XmlDocument, role: Role) -> Result<usize> {
        let items = crate::codec::xml::records_from_document::<T>(document, role)?;
        let count = items.len();
        (self.set)(record, items);
        Ok(count)
    }
}

//! Role resolution: the ordered wire-name → accessor map for one role

use std::fmt;

use crate::error::{MappingError, ODataError, Result};

use super::date::ODataDateFormat;
use super::descriptor::{AccessorKind, ExpandLink, FieldAccess, FieldDescriptor, Record, Role};
use super::value::{FieldValue, Quote, RenderIssue};

/// Fields of `R` carrying one role, ordered by sort order then declaration order
pub struct FieldMap<R: 'static> {
    record: &'static str,
    role: Role,
    entries: Vec<FieldEntry<R>>,
}

pub struct FieldEntry<R: 'static> {
    wire_name: &'static str,
    order: i32,
    field: &'static FieldDescriptor<R>,
}

impl<R: Record> FieldMap<R> {
    /// Collect every field tagged with `role`, skipping fields that also carry
    /// `disallowed`. Each collected field must provide `accessor`.
    pub fn resolve(
        role: Role,
        disallowed: Option<Role>,
        accessor: AccessorKind,
    ) -> std::result::Result<Self, MappingError> {
        let descriptor = R::descriptor();
        let record = descriptor.type_name();
        let mut entries: Vec<FieldEntry<R>> = Vec::new();

        for field in descriptor.fields() {
            if disallowed.is_some_and(|skip| field.has_role(skip)) {
                continue;
            }
            for tag in field.tags().iter().filter(|tag| tag.role == role) {
                if !field.supports(accessor) {
                    return Err(MappingError::MissingAccessor {
                        record,
                        field: field.name(),
                        accessor,
                    });
                }
                if entries.iter().any(|entry| entry.wire_name == tag.wire_name) {
                    return Err(MappingError::DuplicateWireName {
                        record,
                        role,
                        wire_name: tag.wire_name,
                    });
                }
                entries.push(FieldEntry {
                    wire_name: tag.wire_name,
                    order: tag.order,
                    field,
                });
            }
        }

        if entries.is_empty() {
            return Err(MappingError::NoFieldsForRole { record, role });
        }

        // stable: equal orders keep declaration order
        entries.sort_by_key(|entry| entry.order);

        Ok(Self {
            record,
            role,
            entries,
        })
    }

    pub fn getters(role: Role) -> std::result::Result<Self, MappingError> {
        Self::resolve(role, None, AccessorKind::Getter)
    }

    /// String setters for `role`; Expand fields are populated separately
    pub fn setters(role: Role) -> std::result::Result<Self, MappingError> {
        Self::resolve(role, Some(Role::Expand), AccessorKind::StringSetter)
    }

    pub fn expand_links() -> std::result::Result<Self, MappingError> {
        Self::resolve(Role::Expand, None, AccessorKind::ListSetter)
    }

    pub fn record_type(&self) -> &'static str {
        self.record
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn entries(&self) -> &[FieldEntry<R>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn wire_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.wire_name)
    }

    /// Render every entry of `record` as `(wire name, text)` in map order
    pub fn values(
        &self,
        record: &R,
        quote: Quote,
        dates: &ODataDateFormat,
    ) -> Result<Vec<(&'static str, String)>> {
        self.entries
            .iter()
            .map(|entry| {
                let rendered = entry.render(record, self.role, quote, dates)?;
                Ok((entry.wire_name, rendered))
            })
            .collect()
    }
}

impl<R: 'static> fmt::Debug for FieldMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire_names: Vec<&str> = self.entries.iter().map(|entry| entry.wire_name).collect();
        f.debug_struct("FieldMap")
            .field("record", &self.record)
            .field("role", &self.role)
            .field("wire_names", &wire_names)
            .finish()
    }
}

impl<R: Record> FieldEntry<R> {
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn field_name(&self) -> &'static str {
        self.field.name()
    }

    pub fn link(&self) -> Option<&dyn ExpandLink<R>> {
        match self.field.access() {
            FieldAccess::List(link) => Some(link.as_ref()),
            FieldAccess::Scalar { .. } => None,
        }
    }

    /// Read the field; list fields render their elements with `role`
    pub fn value(&self, record: &R, role: Role, dates: &ODataDateFormat) -> Result<FieldValue> {
        match self.field.access() {
            FieldAccess::Scalar { get, .. } => Ok(get(record)),
            FieldAccess::List(link) => link.value(record, role, dates),
        }
    }

    pub fn render(
        &self,
        record: &R,
        role: Role,
        quote: Quote,
        dates: &ODataDateFormat,
    ) -> Result<String> {
        let value = self.value(record, role, dates)?;
        value.render(quote, dates).map_err(|issue| {
            let record = R::descriptor().type_name();
            let field = self.field.name();
            let err = match issue {
                RenderIssue::Null => MappingError::NullValue { record, field },
                other => MappingError::Unrenderable {
                    record,
                    field,
                    reason: other.to_string(),
                },
            };
            err.into()
        })
    }

    /// Write wire text through the field's string setter
    pub fn set(&self, record: &mut R, text: &str) -> Result<()> {
        let type_name = R::descriptor().type_name();
        match self.field.access() {
            FieldAccess::Scalar { set: Some(set), .. } => {
                set(record, text).map_err(|source| ODataError::FieldConversion {
                    record: type_name,
                    property: self.wire_name.to_string(),
                    value: text.to_string(),
                    source,
                })
            }
            _ => Err(MappingError::MissingAccessor {
                record: type_name,
                field: self.field.name(),
                accessor: AccessorKind::StringSetter,
            }
            .into()),
        }
    }
}

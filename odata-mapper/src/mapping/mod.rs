//! Declarative record mapping
//!
//! Records describe their fields once through a [`RecordDescriptor`]; a
//! [`FieldMap`] resolves the fields of one [`Role`] into the ordered list the
//! codec and URL builders iterate over.

pub mod date;
pub mod descriptor;
pub mod field_map;
pub mod value;

pub use date::{DateParseError, ODataDateFormat, parse_datetime};
pub use descriptor::{
    AccessorKind, ExpandLink, FieldAccess, FieldDescriptor, Getter, Record, RecordDescriptor,
    Role, RoleTag, Setter, SetterResult,
};
pub use field_map::{FieldEntry, FieldMap};
pub use value::{FieldValue, Quote, RenderIssue};

//! Payload codec: JSON for writes, Atom XML for reads
//!
//! [`PayloadCodec`] carries the date format used for every rendered value and
//! exposes the read and write paths as one object per connection.

pub mod json;
pub mod xml;

use std::collections::HashMap;

use crate::error::{DeserializationError, Result};
use crate::mapping::{FieldMap, ODataDateFormat, Quote, Record, Role};

use self::xml::{XmlDocument, XmlElement};

/// Apply `name → text` values onto `record` through the setters of `role`.
///
/// With `require_complete`, every setter must find its property; otherwise
/// absent properties leave their field untouched.
pub fn apply_flat_map<R: Record>(
    record: &mut R,
    values: &HashMap<String, String>,
    role: Role,
    require_complete: bool,
) -> Result<()> {
    let map = FieldMap::<R>::setters(role)?;
    for entry in map.entries() {
        match values.get(entry.wire_name()) {
            Some(text) => entry.set(record, text)?,
            None if require_complete => {
                return Err(DeserializationError::new(entry.wire_name())
                    .with_local_type(map.record_type())
                    .into());
            }
            None => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadCodec {
    dates: ODataDateFormat,
}

impl PayloadCodec {
    pub fn new(dates: ODataDateFormat) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> &ODataDateFormat {
        &self.dates
    }

    pub fn dates_mut(&mut self) -> &mut ODataDateFormat {
        &mut self.dates
    }

    pub fn to_wire<R: Record>(&self, record: &R, role: Role) -> Result<String> {
        json::object(record, role, &self.dates)
    }

    pub fn to_wire_list<R: Record>(&self, records: &[R], role: Role) -> Result<String> {
        json::array(records, role, &self.dates)
    }

    /// Rendered `(wire name, text)` pairs of `role`, for URLs and copies
    pub fn values<R: Record>(
        &self,
        record: &R,
        role: Role,
        quote: Quote,
    ) -> Result<Vec<(&'static str, String)>> {
        FieldMap::<R>::getters(role)?.values(record, quote, &self.dates)
    }

    pub fn from_flat_map<R: Record>(
        &self,
        record: &mut R,
        values: &HashMap<String, String>,
        role: Role,
        require_complete: bool,
    ) -> Result<()> {
        apply_flat_map(record, values, role, require_complete)
    }

    pub fn from_xml_entry<R: Record>(
        &self,
        record: &mut R,
        entry: &XmlElement,
        role: Role,
    ) -> Result<()> {
        xml::apply_entry(record, entry, role)
    }

    pub fn from_xml_document<R: Record>(
        &self,
        document: &XmlDocument,
        role: Role,
    ) -> Result<Vec<R>> {
        xml::records_from_document(document, role)
    }

    pub fn from_xml_single<R: Record>(
        &self,
        record: &mut R,
        document: &XmlDocument,
        role: Role,
    ) -> Result<()> {
        xml::apply_single(record, document, role)
    }

    /// A fresh `R` holding only the unquoted `role` values of `source`.
    ///
    /// Dates are handed to the setters as UTC literals with millisecond
    /// precision, whatever zone this codec writes in.
    pub fn copy_keys<R: Record>(&self, source: &R, role: Role) -> Result<R> {
        let values: HashMap<String, String> = FieldMap::<R>::getters(role)?
            .values(source, Quote::None, &ODataDateFormat::default())?
            .into_iter()
            .map(|(wire_name, text)| (wire_name.to_string(), text))
            .collect();
        let mut copy = R::default();
        apply_flat_map(&mut copy, &values, role, true)?;
        Ok(copy)
    }
}

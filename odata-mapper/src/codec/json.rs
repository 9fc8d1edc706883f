//! JSON write payloads
//!
//! Objects are assembled from already-rendered literals. Dates go out as bare
//! `datetime'...'` literals, which SAP gateways accept in v2 JSON bodies.

use crate::error::Result;
use crate::mapping::{FieldMap, ODataDateFormat, Quote, Record, Role};

/// `{"wire":value,...}` in field map order
pub fn object<R: Record>(record: &R, role: Role, dates: &ODataDateFormat) -> Result<String> {
    let map = FieldMap::<R>::getters(role)?;
    let members = map
        .values(record, Quote::Double, dates)?
        .into_iter()
        .map(|(wire_name, value)| format!("{}:{}", Quote::Double.apply(wire_name), value))
        .collect::<Vec<_>>();
    Ok(format!("{{{}}}", members.join(",")))
}

/// `[{...},{...}]`
pub fn array<R: Record>(records: &[R], role: Role, dates: &ODataDateFormat) -> Result<String> {
    let objects = records
        .iter()
        .map(|record| object(record, role, dates))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[{}]", objects.join(",")))
}

//! `$filter` and parameter query suffixes
//!
//! Only flat equality is supported: `name eq value` terms joined with `and`.
//! Values are passed through as already-rendered OData literals.

use super::encode::{encode, encode_all};
use crate::api::constants::FILTER_PREFIX;
use crate::error::{ODataError, Result};

/// `?%24filter=name%20eq%20value%20and%20...`
pub fn filter_suffix_pairs<N, V>(pairs: &[(N, V)]) -> Result<String>
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return Err(ODataError::InvalidArgument(
            "a filter needs at least one name/value pair".to_string(),
        ));
    }
    let expression = pairs
        .iter()
        .map(|(name, value)| format!("{} eq {}", name.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join(" and ");
    Ok(format!("{}{}", FILTER_PREFIX, encode_all(&expression)))
}

/// Same as [`filter_suffix_pairs`] over a flat `[name, value, name, value, ...]` list
pub fn filter_suffix(name_value_pairs: &[&str]) -> Result<String> {
    if name_value_pairs.is_empty() || name_value_pairs.len() % 2 != 0 {
        return Err(ODataError::InvalidArgument(format!(
            "name/value list length must be non-zero and even: {}",
            name_value_pairs.len()
        )));
    }
    let pairs: Vec<(&str, &str)> = name_value_pairs
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    filter_suffix_pairs(&pairs)
}

/// `?name=value&...` with names and values encoded; empty when there are no pairs
pub fn parameter_suffix_pairs<N, V>(pairs: &[(N, V)]) -> String
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return String::new();
    }
    let parameters = pairs
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name.as_ref()), encode(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{}", parameters)
}

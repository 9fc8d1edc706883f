//! OData URL building
//!
//! Key predicates, `$filter` suffixes and function-import parameters, all built
//! from already-rendered literals.

pub mod encode;
pub mod filters;

pub use encode::{encode, encode_all};
pub use filters::{filter_suffix, filter_suffix_pairs, parameter_suffix_pairs};

/// `(value)` for a single key, `(A=1,B='x')` for compound keys
pub fn key_predicate<N, V>(pairs: &[(N, V)]) -> String
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    let inner = match pairs {
        [(_, value)] => encode(value.as_ref()),
        _ => pairs
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name.as_ref()), encode(value.as_ref())))
            .collect::<Vec<_>>()
            .join(","),
    };
    format!("({})", inner)
}

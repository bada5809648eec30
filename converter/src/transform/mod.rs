//! Record transformation.
//!
//! - Coerce: float-then-truncate conversion of numeric fields

pub mod coerce;

pub use coerce::{
    coerce,
    coerce_dataset,
    coerce_fields,
    coerce_value,
    parse_truncated,
    DEFAULT_NUMERIC_FIELDS,
};

//! Provider table handling.

pub mod extract;

pub use extract::{extract_close_series, resolve_close_column};

//! Core DTE model, lenient field coercion and errors.
//!
//! The model mirrors the subset of the SII `Documento` schema that gets
//! exported: header identifiers plus the `Detalle` line items. Every optional
//! field is an `Option`; a missing element and a blank element are both
//! `None`.

mod coerce;
mod error;
mod types;

pub use coerce::{coerce_field, coerce_int, non_blank};
pub use error::*;
pub use types::*;

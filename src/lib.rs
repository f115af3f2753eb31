//! # sii-dte
//!
//! Extracts invoice line items from Chilean SII electronic tax documents
//! (`EnvioDTE` / `DTE` / `Documento` XML) and exports them as CSV.
//!
//! Documents are located regardless of whether they arrive wrapped in an
//! `EnvioDTE` envelope, in a single `DTE` wrapper, or as a bare `Documento`
//! root. Field extraction is lenient: missing elements become `None` and
//! numeric text that cannot be parsed is kept verbatim instead of failing the
//! document. Only XML that is not well-formed is an error, and in a batch that
//! error is confined to the offending file.
//!
//! ## Quick Start
//!
//! ```rust
//! use sii_dte::export::{CsvConfig, rows_to_csv};
//! use sii_dte::parse::parse_documents;
//! use sii_dte::Row;
//!
//! let xml = br#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
//!   <Encabezado><IdDoc><TipoDTE>33</TipoDTE><Folio>123</Folio></IdDoc></Encabezado>
//!   <Detalle><NroLinDet>1</NroLinDet><NmbItem>Flete</NmbItem><MontoItem>15000</MontoItem></Detalle>
//! </Documento></DTE></SetDTE></EnvioDTE>"#;
//!
//! let docs = parse_documents(xml).unwrap();
//! let csv = rows_to_csv(&Row::from_documents(&docs), &CsvConfig::default());
//! assert_eq!(csv.lines().nth(1), Some("123,33,1,,,Flete,,,,15000"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, lenient coercion, errors |
//! | `parse` (default) | XML tree, document locator, field extractor |
//! | `export` (default) | CSV rendering, batch conversion |
//! | `archive` | ZIP archive with one CSV per input |
//! | `cli` | `sii-dte` command-line binary |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "parse")]
pub mod parse;

#[cfg(feature = "export")]
pub mod export;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

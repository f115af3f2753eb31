//! CSV and ZIP export of extracted line items.
//!
//! Every export uses the same fixed column order (see [`COLUMNS`]). A batch
//! produces:
//! - one CSV per converted input file ([`BatchOutcome::per_file_csv`]),
//! - one merged CSV with the rows of all files in submission order
//!   ([`BatchOutcome::merged_csv`]),
//! - optionally a ZIP holding the per-file CSVs (`to_zip`, feature `archive`).
//!
//! # Example
//!
//! ```
//! use sii_dte::export::*;
//!
//! let files = vec![
//!     SourceFile::new("ok.xml", r#"<Documento xmlns="http://www.sii.cl/SiiDte"/>"#),
//!     SourceFile::new("broken.xml", "<Documento>"),
//! ];
//! let outcome = convert_batch(&files);
//! assert_eq!(outcome.converted.len(), 1);
//! assert_eq!(outcome.failures[0].name, "broken.xml");
//!
//! let merged = outcome.merged_csv(&CsvConfig::default());
//! assert!(merged.starts_with("Folio,TipoDTE,"));
//! ```

#[cfg(feature = "archive")]
mod archive;
mod batch;
mod csv;

#[cfg(feature = "archive")]
pub use archive::to_zip;
pub use batch::{
    BatchOutcome, ConvertedFile, FileFailure, SourceFile, convert_batch, convert_file,
    csv_file_name,
};
pub use csv::{COLUMNS, CsvConfig, LineEnding, rows_to_csv};

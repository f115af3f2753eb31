//! ZIP archive with one CSV per converted file.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::batch::BatchOutcome;
use super::csv::CsvConfig;
use crate::core::DteError;

fn archive_err(e: impl std::fmt::Display) -> DteError {
    DteError::Archive(e.to_string())
}

/// Build a deflate-compressed ZIP holding `<stem>.csv` for every converted
/// file, in submission order.
///
/// Entry names are those of [`BatchOutcome::per_file_csv`], so the archive
/// matches the per-file CSVs written elsewhere.
pub fn to_zip(outcome: &BatchOutcome, config: &CsvConfig) -> Result<Vec<u8>, DteError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, csv) in outcome.per_file_csv(config) {
        writer.start_file(name.as_str(), options).map_err(archive_err)?;
        writer.write_all(csv.as_bytes())?;
    }

    let cursor = writer.finish().map_err(archive_err)?;
    Ok(cursor.into_inner())
}

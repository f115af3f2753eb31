//! Converting several input files in one go with per-file failure isolation.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use super::csv::{CsvConfig, rows_to_csv};
use crate::core::{Document, DteError, Row};
use crate::parse::parse_documents;

/// One input buffer with the name it was submitted under.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A file that parsed successfully.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    /// Submission position within the batch.
    pub index: usize,
    pub name: String,
    pub documents: Vec<Document>,
    pub rows: Vec<Row>,
}

impl ConvertedFile {
    /// Output file name: the input name with its extension replaced by `.csv`.
    pub fn csv_name(&self) -> String {
        csv_file_name(&self.name)
    }
}

/// A file that could not be parsed. It is left out of every output.
#[derive(Debug)]
pub struct FileFailure {
    /// Submission position within the batch.
    pub index: usize,
    pub name: String,
    pub error: DteError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

/// Result of [`convert_batch`]: converted files and failures, each ordered by
/// submission index.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub converted: Vec<ConvertedFile>,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    /// Record a converted file, keeping submission order.
    pub fn push_converted(&mut self, file: ConvertedFile) {
        let at = self.converted.partition_point(|c| c.index < file.index);
        self.converted.insert(at, file);
    }

    /// Record a failure, keeping submission order.
    pub fn push_failure(&mut self, failure: FileFailure) {
        let at = self.failures.partition_point(|f| f.index < failure.index);
        self.failures.insert(at, failure);
    }

    /// Total number of rows across converted files.
    pub fn row_count(&self) -> usize {
        self.converted.iter().map(|c| c.rows.len()).sum()
    }

    /// One CSV with the rows of every converted file in submission order.
    pub fn merged_csv(&self, config: &CsvConfig) -> String {
        rows_to_csv(self.converted.iter().flat_map(|c| &c.rows), config)
    }

    /// One `(csv_name, csv)` pair per converted file.
    ///
    /// Names are unique within the batch: two inputs that map to the same
    /// CSV name get numbered entries (`a.csv`, `a-2.csv`, ...).
    pub fn per_file_csv(&self, config: &CsvConfig) -> Vec<(String, String)> {
        let mut used = HashSet::new();
        self.converted
            .iter()
            .map(|c| {
                let name = unique_name(&mut used, &c.csv_name());
                (name, rows_to_csv(&c.rows, config))
            })
            .collect()
    }
}

/// Parse one file into a [`ConvertedFile`].
pub fn convert_file(index: usize, file: &SourceFile) -> Result<ConvertedFile, FileFailure> {
    match parse_documents(&file.bytes) {
        Ok(documents) => {
            let rows = Row::from_documents(&documents);
            Ok(ConvertedFile {
                index,
                name: file.name.clone(),
                documents,
                rows,
            })
        }
        Err(error) => Err(FileFailure {
            index,
            name: file.name.clone(),
            error,
        }),
    }
}

/// Convert every file in order. A failing file is recorded and skipped; it
/// never stops the rest of the batch.
pub fn convert_batch<'a, I>(files: I) -> BatchOutcome
where
    I: IntoIterator<Item = &'a SourceFile>,
{
    let mut outcome = BatchOutcome::default();
    for (index, file) in files.into_iter().enumerate() {
        match convert_file(index, file) {
            Ok(converted) => {
                tracing::info!(
                    file = %converted.name,
                    documents = converted.documents.len(),
                    rows = converted.rows.len(),
                    "converted"
                );
                outcome.push_converted(converted);
            }
            Err(failure) => {
                tracing::warn!(file = %failure.name, error = %failure.error, "skipping file");
                outcome.push_failure(failure);
            }
        }
    }
    outcome
}

/// Replace the extension of `name` with `.csv`, or append it when there is
/// none. Only the final path component is kept.
pub fn csv_file_name(name: &str) -> String {
    let path = Path::new(name);
    let file = path.file_name().map(Path::new).unwrap_or(path);
    file.with_extension("csv").to_string_lossy().into_owned()
}

fn unique_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

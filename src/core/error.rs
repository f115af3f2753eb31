use thiserror::Error;

/// Errors that can occur while reading or exporting DTE documents.
///
/// Missing or unparsable fields are never errors; they surface as absent
/// values or raw text in the extracted model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DteError {
    /// The byte buffer is not well-formed XML.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Reading an input or writing an output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive assembly failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(String),
}

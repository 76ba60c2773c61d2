//! Error types for batch ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning submitted bytes into a raw batch.
///
/// Every variant except the file-system ones means the request body itself is
/// malformed; see [`IngestError::is_malformed_body`].
#[derive(Debug, Error)]
pub enum IngestError {
    // === Body Errors ===
    /// Byte-order mark of an encoding other than UTF-8.
    #[error("unsupported encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    /// Content is not valid UTF-8.
    #[error("body is not valid UTF-8")]
    InvalidUtf8,

    /// Body has no content at all.
    #[error("body is empty")]
    EmptyBody,

    /// Header row is missing or has no labels.
    #[error("could not parse header row")]
    NoHeader,

    /// Header row contains an empty label.
    #[error("header column {position} has an empty name")]
    EmptyColumnName { position: usize },

    /// Malformed record (unbalanced quotes, wrong field count).
    #[error("failed to parse CSV{}: {message}", at_line(.line))]
    CsvParse { line: Option<u64>, message: String },

    // === File System Errors ===
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is {size} bytes, exceeding the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },
}

impl IngestError {
    /// True when the submitted content is at fault rather than the file system.
    pub fn is_malformed_body(&self) -> bool {
        !matches!(
            self,
            Self::FileNotFound { .. } | Self::FileRead { .. } | Self::FileTooLarge { .. }
        )
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse {
            line: err.position().map(csv::Position::line),
            message: err.to_string(),
        }
    }
}

fn at_line(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

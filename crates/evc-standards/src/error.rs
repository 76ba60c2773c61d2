//! Error types for schema registry operations.

use std::path::PathBuf;
use thiserror::Error;

use evc_model::ValidationProfile;

/// Errors that can occur when loading or querying dataset schemas.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// No schema is registered for the dataset.
    #[error("schema not found for dataset '{dataset_id}' (profile {profile})")]
    SchemaNotFound {
        dataset_id: String,
        profile: ValidationProfile,
    },

    /// Field table directory not found.
    #[error("standards directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read a field table file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV content.
    #[error("failed to read CSV {file}: {source}")]
    CsvRead {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// Invalid value in a field table column.
    #[error("invalid {field} value '{value}' in {file}")]
    InvalidValue {
        field: &'static str,
        value: String,
        file: String,
    },

    /// A dataset declares the same field twice.
    #[error("dataset '{dataset_id}' declares field '{field_name}' more than once")]
    DuplicateField {
        dataset_id: String,
        field_name: String,
    },

    /// A composite key references a field the dataset does not declare.
    #[error("dataset '{dataset_id}' key references unknown field '{field_name}'")]
    UnknownKeyField {
        dataset_id: String,
        field_name: String,
    },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, StandardsError>;

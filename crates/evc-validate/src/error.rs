//! Unified error type for submission validation.
//!
//! Only request-level problems surface here. Everything wrong with the
//! content of a well-formed batch is reported as a
//! [`Condition`](evc_model::Condition) instead.

use thiserror::Error;

use evc_ingest::IngestError;
use evc_standards::StandardsError;

use crate::constraints::LookupError;

/// Errors that abort a validation run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ValidateError {
    // =========================================================================
    // REQUEST ERRORS
    // =========================================================================
    /// Body could not be decoded into a batch.
    #[error("malformed body: {0}")]
    MalformedBody(#[from] IngestError),

    /// Dataset or profile has no schema.
    #[error(transparent)]
    SchemaNotFound(#[from] StandardsError),

    /// Batch exceeds the configured row bound.
    #[error("batch has {rows} rows, exceeding the limit of {max_rows}")]
    BatchTooLarge {
        /// Data rows in the submitted batch.
        rows: usize,
        /// Configured maximum.
        max_rows: usize,
    },

    // =========================================================================
    // INFRASTRUCTURE ERRORS
    // =========================================================================
    /// Persisted-lookup collaborator failed.
    #[error("constraint lookup failed: {source}")]
    ConstraintLookupFailed {
        #[source]
        source: LookupError,
    },

    /// Typed batch could not be exported to a DataFrame.
    #[error("failed to build typed batch frame: {message}")]
    DataFrame {
        /// Error message from polars.
        message: String,
    },
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidateError>;

impl ValidateError {
    /// Stable machine-readable error code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "malformed_body",
            Self::SchemaNotFound(_) => "schema_not_found",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::ConstraintLookupFailed { .. } => "constraint_lookup_failed",
            Self::DataFrame { .. } => "dataframe",
        }
    }

    /// True when the submitter can fix the problem by changing the request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MalformedBody(err) => err.is_malformed_body(),
            Self::SchemaNotFound(StandardsError::SchemaNotFound { .. }) => true,
            Self::BatchTooLarge { .. } => true,
            _ => false,
        }
    }
}

impl From<polars::error::PolarsError> for ValidateError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

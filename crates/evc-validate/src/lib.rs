//! Submission batch validation.
//!
//! This crate provides the validation engine:
//!
//! - **Field validators**: one per datatype, sharing an empty-value policy
//! - **Batch validator**: structural checks, dispatch and record counts
//! - **Duplicate constraint checker**: null-tolerant composite key matching,
//!   within the batch and against accepted batches
//! - **Status resolver**: verdict plus constraint findings to `Valid`/`Invalid`
//!
//! # Example
//!
//! ```ignore
//! use evc_model::ValidationOptions;
//! use evc_standards::SchemaRegistry;
//! use evc_validate::{NoPersistedBatches, SubmissionRequest, evaluate_submission};
//!
//! let registry = SchemaRegistry::global()?;
//! let raw = evc_ingest::read_batch(body)?;
//! let options = ValidationOptions::default();
//! let request = SubmissionRequest {
//!     dataset_id: "sessions",
//!     batch_id: Some("upload-42"),
//!     options: &options,
//!     raw: &raw,
//! };
//! let report = evaluate_submission(registry, &request, &NoPersistedBatches)?;
//! println!("{} ({} rejected)", report.status, report.verdict.rejected_records);
//! ```

pub mod batch;
pub mod constraints;
pub mod error;
pub mod fields;
pub mod status;
pub mod submission;
pub mod typed;

pub use batch::{BatchOutcome, PASSTHROUGH_COLUMNS, is_passthrough_column, validate_batch};
pub use constraints::{
    ConstraintKeyTuple, InMemoryLookup, LookupError, LookupMatches, NoPersistedBatches,
    PersistedLookup, check_constraints, key_tuples, match_stored,
};
pub use error::{Result, ValidateError};
pub use fields::{FieldOutcome, validate_field};
pub use status::resolve_status;
pub use submission::{
    SubmissionReport, SubmissionRequest, check_dataset_constraints, evaluate_submission,
    validate_dataset,
};
pub use typed::{CellValue, TypedBatch, TypedCell, TypedColumn, Unconvertible, canonical_text};

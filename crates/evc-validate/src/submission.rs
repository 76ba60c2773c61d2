//! End-to-end submission evaluation.

use serde::Serialize;

use evc_ingest::RawBatch;
use evc_model::{Condition, SubmissionStatus, ValidationOptions, ValidationProfile, ValidationVerdict};
use evc_standards::SchemaRegistry;

use crate::batch::{BatchOutcome, validate_batch};
use crate::constraints::{PersistedLookup, check_constraints};
use crate::error::{Result, ValidateError};
use crate::status::resolve_status;
use crate::typed::TypedBatch;

/// One batch submitted for a dataset.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRequest<'a> {
    pub dataset_id: &'a str,
    /// Upload identifier; excluded from the cross-batch lookup when set.
    pub batch_id: Option<&'a str>,
    pub options: &'a ValidationOptions,
    pub raw: &'a RawBatch,
}

/// Everything the caller needs to decide whether to persist a batch.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    /// Verdict with constraint conditions merged in.
    pub verdict: ValidationVerdict,
    pub status: SubmissionStatus,
    #[serde(skip)]
    pub typed_batch: TypedBatch,
}

/// Validate a raw batch against a dataset resolved from the registry.
pub fn validate_dataset(
    registry: &SchemaRegistry,
    dataset_id: &str,
    profile: ValidationProfile,
    raw: &RawBatch,
) -> Result<BatchOutcome> {
    let schema = registry.get_schema(dataset_id, profile)?;
    Ok(validate_batch(schema, raw))
}

/// Run the constraint checker for a dataset resolved from the registry.
pub fn check_dataset_constraints(
    registry: &SchemaRegistry,
    dataset_id: &str,
    typed_batch: &TypedBatch,
    lookup: &dyn PersistedLookup,
    batch_id: Option<&str>,
    options: &ValidationOptions,
) -> Result<Vec<Condition>> {
    let schema = registry.get_schema(dataset_id, options.profile)?;
    check_constraints(schema, typed_batch, lookup, batch_id, options.all_empty_keys)
}

/// Validate a submission, check its keys and resolve its status.
///
/// Constraint checking is skipped when the batch has column-level errors,
/// since those already reject every record.
pub fn evaluate_submission(
    registry: &SchemaRegistry,
    request: &SubmissionRequest<'_>,
    lookup: &dyn PersistedLookup,
) -> Result<SubmissionReport> {
    let options = request.options;
    if let Some(max_rows) = options.max_rows
        && request.raw.row_count() > max_rows
    {
        return Err(ValidateError::BatchTooLarge {
            rows: request.raw.row_count(),
            max_rows,
        });
    }

    let schema = registry.get_schema(request.dataset_id, options.profile)?;
    let BatchOutcome {
        verdict,
        typed_batch,
    } = validate_batch(schema, request.raw);

    let constraint_conditions = if verdict.has_column_level_errors() {
        tracing::debug!("skipping constraint check after column-level errors");
        Vec::new()
    } else {
        check_constraints(
            schema,
            &typed_batch,
            lookup,
            request.batch_id,
            options.all_empty_keys,
        )?
    };

    let status = resolve_status(&verdict, &constraint_conditions);
    let verdict = verdict.merged(constraint_conditions);
    tracing::info!(
        dataset = %schema.dataset_id,
        batch_id = request.batch_id.unwrap_or("-"),
        %status,
        "submission evaluated"
    );

    Ok(SubmissionReport {
        verdict,
        status,
        typed_batch,
    })
}

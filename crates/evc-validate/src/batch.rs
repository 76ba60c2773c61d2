//! Batch validator.
//!
//! Runs the structural checks (empty batch, missing required columns,
//! duplicate labels, unknown labels) and then dispatches every recognized
//! column to its field validator. The full condition list is always
//! collected; only a duplicate column label stops the run before field
//! validation, since row semantics are undefined once a label is ambiguous.

use evc_ingest::RawBatch;
use evc_model::{Condition, ConditionKind, DatasetSchema, ValidationVerdict};

use crate::fields::validate_field;
use crate::typed::{TypedBatch, TypedColumn};

/// Column labels resolved by other collaborators and carried through
/// untouched: the station registry's entity id and the internal surrogate key.
pub const PASSTHROUGH_COLUMNS: &[&str] = &["station_uuid", "record_id"];

/// Verdict plus the typed projection produced alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub verdict: ValidationVerdict,
    pub typed_batch: TypedBatch,
}

pub fn is_passthrough_column(label: &str) -> bool {
    PASSTHROUGH_COLUMNS.contains(&label)
}

/// Validate a raw batch against a resolved dataset schema.
pub fn validate_batch(schema: &DatasetSchema, raw: &RawBatch) -> BatchOutcome {
    let span = tracing::info_span!(
        "validate_batch",
        dataset = %schema.dataset_id,
        profile = %schema.profile,
        rows = raw.row_count()
    );
    let _guard = span.enter();

    let total_records = raw.row_count();
    let mut conditions = Vec::new();
    let mut typed_batch = TypedBatch::new(total_records);

    if raw.is_empty() {
        tracing::warn!("batch contains no data rows");
        conditions.push(Condition::column("", ConditionKind::EmptyBatch));
        return finish(total_records, conditions, typed_batch);
    }

    for field in schema.required_fields() {
        if raw.column_index(&field.field_name).is_none() {
            conditions.push(Condition::column(
                &field.field_name,
                ConditionKind::MissingRequiredColumn,
            ));
        }
    }

    let labels = raw.label_counts();
    let mut duplicated = false;
    for &(label, occurrences) in &labels {
        if occurrences > 1 {
            tracing::warn!(column = label, occurrences, "duplicate column label");
            conditions.push(Condition::column(
                label,
                ConditionKind::DuplicateColumn { occurrences },
            ));
            duplicated = true;
        }
    }
    if duplicated {
        return finish(total_records, conditions, typed_batch);
    }

    for &(label, _) in &labels {
        if !schema.contains_field(label) && !is_passthrough_column(label) {
            tracing::warn!(column = label, "column is not part of the dataset");
            conditions.push(Condition::column(label, ConditionKind::UnknownColumn));
        }
    }

    let record_flags = raw.record_flags();
    for (idx, label) in raw.headers().iter().enumerate() {
        let values = raw.column(idx);
        match schema.field(label) {
            Some(definition) => {
                tracing::debug!(column = %label, datatype = %definition.datatype, "validating column");
                let outcome = validate_field(definition, &values, &record_flags);
                conditions.extend(outcome.conditions);
                typed_batch.push(outcome.column);
            }
            None => typed_batch.push(TypedColumn::passthrough(label.as_str(), &values)),
        }
    }

    finish(total_records, conditions, typed_batch)
}

fn finish(total_records: usize, conditions: Vec<Condition>, typed_batch: TypedBatch) -> BatchOutcome {
    let verdict = ValidationVerdict::tally(total_records, conditions);
    tracing::info!(
        compliant = verdict.is_compliant,
        valid = verdict.valid_records,
        rejected = verdict.rejected_records,
        errors = verdict.error_count(),
        notices = verdict.notice_count(),
        "batch validated"
    );
    BatchOutcome {
        verdict,
        typed_batch,
    }
}

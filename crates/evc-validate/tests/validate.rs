use evc_ingest::{RECORD_FLAG_COLUMN, RawBatch};
use evc_model::{
    AllEmptyKeyPolicy, Condition, Datatype, DatasetSchema, FieldDefinition, Severity,
    ValidationProfile,
};
use evc_validate::{
    CellValue, InMemoryLookup, NoPersistedBatches, check_constraints, key_tuples, validate_batch,
};
use rust_decimal::Decimal;

fn keyed_schema() -> DatasetSchema {
    DatasetSchema::new(
        "outages",
        ValidationProfile::Baseline,
        vec![
            FieldDefinition::new("a", Datatype::String).required(),
            FieldDefinition::new("b", Datatype::String),
            FieldDefinition::new("c", Datatype::String).required(),
        ],
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
    )
}

fn energy_schema() -> DatasetSchema {
    DatasetSchema::new(
        "sessions",
        ValidationProfile::RelaxedNulls,
        vec![
            FieldDefinition::new("station_id", Datatype::String).required(),
            FieldDefinition::new("energy_kwh", Datatype::Decimal)
                .required()
                .empty_when_flagged()
                .with_precision(11, 2),
            FieldDefinition::new(RECORD_FLAG_COLUMN, Datatype::Boolean),
        ],
        vec!["station_id".to_string()],
    )
}

fn codes(conditions: &[Condition]) -> Vec<&'static str> {
    conditions.iter().map(Condition::code).collect()
}

#[test]
fn validation_is_idempotent() {
    let raw = RawBatch::from_strs(
        &["station_id", "energy_kwh", "mystery"],
        &[&["S1", "1.234", "?"], &["", "abc", "?"], &["S3", "3.00", "?"]],
    )
    .unwrap();
    let schema = energy_schema();

    let first = validate_batch(&schema, &raw);
    let second = validate_batch(&schema, &raw);
    assert_eq!(first, second);
}

#[test]
fn null_tolerant_key_matching() {
    let schema = keyed_schema();
    let raw = RawBatch::from_strs(
        &["a", "b", "c"],
        &[&["x", "", "z"], &["x", "1", "z"], &["x", "", "z"]],
    )
    .unwrap();
    let outcome = validate_batch(&schema, &raw);
    assert!(outcome.verdict.is_compliant);

    let conditions = check_constraints(
        &schema,
        &outcome.typed_batch,
        &NoPersistedBatches,
        None,
        AllEmptyKeyPolicy::Group,
    )
    .unwrap();

    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].error_row, None);
    assert_eq!(conditions[0].header_name, "a, b, c");
    assert_eq!(
        conditions[0].error_description,
        "Duplicate records for a=x, c=z in rows 1, 3"
    );
}

#[test]
fn required_with_relaxation() {
    let schema = energy_schema();

    let flagged = RawBatch::from_strs(
        &["station_id", "energy_kwh", RECORD_FLAG_COLUMN],
        &[&["S1", "", "TRUE"]],
    )
    .unwrap();
    let outcome = validate_batch(&schema, &flagged);
    assert_eq!(outcome.verdict.conditions.len(), 1);
    assert_eq!(outcome.verdict.conditions[0].severity, Severity::Notice);
    assert_eq!(outcome.verdict.rejected_records, 0);
    assert!(outcome.verdict.is_compliant);

    let unflagged = RawBatch::from_strs(
        &["station_id", "energy_kwh", RECORD_FLAG_COLUMN],
        &[&["S1", "", "FALSE"]],
    )
    .unwrap();
    let outcome = validate_batch(&schema, &unflagged);
    assert_eq!(codes(&outcome.verdict.conditions), vec!["required_value_missing"]);
    assert_eq!(outcome.verdict.conditions[0].severity, Severity::Error);
    assert_eq!(outcome.verdict.rejected_records, 1);
    assert!(!outcome.verdict.is_compliant);
}

#[test]
fn duplicate_column_short_circuits() {
    let schema = energy_schema();
    let raw = RawBatch::from_strs(
        &["station_id", "energy_kwh", "energy_kwh"],
        &[&["S1", "abc", "1.0"], &["", "1.00", "2.0"], &["S3", "x", "y"]],
    )
    .unwrap();
    let outcome = validate_batch(&schema, &raw);

    assert_eq!(codes(&outcome.verdict.conditions), vec!["duplicate_column"]);
    assert_eq!(outcome.verdict.conditions[0].header_name, "energy_kwh");
    assert_eq!(
        outcome.verdict.conditions[0].error_description,
        "Column energy_kwh appears 2 times"
    );
    assert_eq!(outcome.verdict.rejected_records, outcome.verdict.total_records);
    assert_eq!(outcome.verdict.valid_records, 0);
}

#[test]
fn decimal_boundary() {
    let schema = energy_schema();
    let raw = RawBatch::from_strs(
        &["station_id", "energy_kwh"],
        &[&["S1", "123456789.12"], &["S2", "1234567890.12"]],
    )
    .unwrap();
    let outcome = validate_batch(&schema, &raw);

    assert_eq!(codes(&outcome.verdict.conditions), vec!["max_length_exceeded"]);
    assert_eq!(outcome.verdict.conditions[0].error_row, Some(2));
    assert_eq!(outcome.verdict.valid_records, 1);
}

#[test]
fn failed_cells_keep_a_sentinel() {
    let schema = energy_schema();
    let raw = RawBatch::from_strs(&["station_id", "energy_kwh"], &[&["S1", "lots"], &["S2", "4.5"]])
        .unwrap();
    let outcome = validate_batch(&schema, &raw);

    let energy = outcome.typed_batch.column("energy_kwh").unwrap();
    assert!(energy.cells[0].is_err());
    assert_eq!(energy.cells[1], Ok(CellValue::Decimal(Decimal::new(45, 1))));
}

#[test]
fn key_fields_absent_from_batch_are_empty() {
    let schema = keyed_schema();
    let raw = RawBatch::from_strs(&["a", "c"], &[&["x", "z"]]).unwrap();
    let outcome = validate_batch(&schema, &raw);

    let tuples = key_tuples(schema.unique_key_fields(), &outcome.typed_batch);
    assert_eq!(tuples.len(), 1);
    assert_eq!(tuples[0].components().len(), 2);
}

#[test]
fn cross_batch_matches_name_prior_batches() {
    let schema = keyed_schema();
    let accepted = RawBatch::from_strs(&["a", "b", "c"], &[&["x", "", "z"], &["y", "2", "z"]])
        .unwrap();
    let accepted_typed = validate_batch(&schema, &accepted).typed_batch;
    let lookup = InMemoryLookup::new()
        .with_batch("batch-2", key_tuples(schema.unique_key_fields(), &accepted_typed))
        .with_batch("batch-1", key_tuples(schema.unique_key_fields(), &accepted_typed))
        .with_batch("batch-3", key_tuples(schema.unique_key_fields(), &accepted_typed));

    let incoming = RawBatch::from_strs(
        &["a", "b", "c"],
        &[&["y", "2", "z"], &["q", "", "z"], &["x", "", "z"]],
    )
    .unwrap();
    let typed = validate_batch(&schema, &incoming).typed_batch;

    let conditions = check_constraints(
        &schema,
        &typed,
        &lookup,
        Some("batch-3"),
        AllEmptyKeyPolicy::Group,
    )
    .unwrap();

    let descriptions: Vec<&str> = conditions
        .iter()
        .map(|c| c.error_description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Record a=y, b=2, c=z already exists in accepted batch(es) batch-1, batch-2",
            "Record a=x, c=z already exists in accepted batch(es) batch-1, batch-2",
        ]
    );
    assert!(conditions.iter().all(|c| c.error_row.is_none()));
}

#[test]
fn constraint_check_is_repeatable_and_leaves_schema_alone() {
    let schema = keyed_schema();
    let raw = RawBatch::from_strs(
        &["a", "b", "c"],
        &[&["x", "1", "z"], &["y", "", "z"], &["x", "1", "z"], &["y", "", "z"]],
    )
    .unwrap();
    let typed = validate_batch(&schema, &raw).typed_batch;
    let key_before = schema.unique_key_fields().to_vec();

    let first = check_constraints(&schema, &typed, &NoPersistedBatches, None, AllEmptyKeyPolicy::Group)
        .unwrap();
    let second = check_constraints(&schema, &typed, &NoPersistedBatches, None, AllEmptyKeyPolicy::Group)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(schema.unique_key_fields(), key_before.as_slice());
}

#[test]
fn all_empty_keys_follow_policy() {
    let schema = DatasetSchema::new(
        "capital_costs",
        ValidationProfile::Baseline,
        vec![
            FieldDefinition::new("station_id", Datatype::String),
            FieldDefinition::new("program_code", Datatype::String),
        ],
        vec!["station_id".to_string(), "program_code".to_string()],
    );
    let raw = RawBatch::from_strs(&["station_id", "program_code"], &[&["", ""], &["", ""]]).unwrap();
    let typed = validate_batch(&schema, &raw).typed_batch;

    let grouped =
        check_constraints(&schema, &typed, &NoPersistedBatches, None, AllEmptyKeyPolicy::Group)
            .unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(
        grouped[0].error_description,
        "Duplicate records for (all key fields empty) in rows 1, 2"
    );

    let ignored =
        check_constraints(&schema, &typed, &NoPersistedBatches, None, AllEmptyKeyPolicy::Ignore)
            .unwrap();
    assert!(ignored.is_empty());
}

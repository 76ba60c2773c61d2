use std::collections::BTreeMap;

use evc_ingest::{RawBatch, read_batch};
use evc_model::{
    AllEmptyKeyPolicy, SubmissionStatus, ValidationOptions, ValidationProfile,
};
use evc_standards::{SchemaRegistry, parse_tables};
use evc_validate::{
    ConstraintKeyTuple, InMemoryLookup, LookupError, LookupMatches, NoPersistedBatches,
    PersistedLookup, SubmissionRequest, ValidateError, check_dataset_constraints,
    evaluate_submission, key_tuples, validate_dataset,
};

const DATASETS: &str = "\
dataset_id,name,description,unique_key
demo,Demo Sessions,End-to-end fixture,station_id|session_id
";

const FIELDS: &str = "\
dataset_id,field_name,datatype,required,nullable,flag_relaxation,length,min_length,max_length,min_value,max_value,max_precision,max_scale,timestamp_format
demo,station_id,string,true,false,,,,,,,,,
demo,energy_kwh,decimal,false,false,,,,,,,,2,
demo,session_id,string,false,false,,,,,,,,,
";

fn demo_registry() -> SchemaRegistry {
    let specs = parse_tables(DATASETS, "datasets.csv", FIELDS, "fields.csv").unwrap();
    SchemaRegistry::from_specs(specs)
}

fn request<'a>(raw: &'a RawBatch, options: &'a ValidationOptions) -> SubmissionRequest<'a> {
    SubmissionRequest {
        dataset_id: "demo",
        batch_id: Some("upload-2"),
        options,
        raw,
    }
}

struct FailingLookup;

impl PersistedLookup for FailingLookup {
    fn find_matches(
        &self,
        _key_fields: &[String],
        _candidates: &[ConstraintKeyTuple],
        _excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError> {
        Err("database unavailable".into())
    }
}

#[test]
fn end_to_end_scenario() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id,energy_kwh,session_id\nS1,12.345,A\nS1,10.00,A\n").unwrap();
    let options = ValidationOptions::default();

    let report = evaluate_submission(&registry, &request(&raw, &options), &NoPersistedBatches)
        .unwrap();

    assert_eq!(report.status, SubmissionStatus::Invalid);
    insta::assert_json_snapshot!(report.verdict, @r###"
    {
      "is_compliant": false,
      "total_records": 2,
      "valid_records": 0,
      "rejected_records": 2,
      "conditions": [
        {
          "error_row": 1,
          "header_name": "energy_kwh",
          "error_description": "Field energy_kwh exceeds max precision of 2 digits after the decimal point (found 3)",
          "severity": "error"
        },
        {
          "error_row": null,
          "header_name": "station_id, session_id",
          "error_description": "Duplicate records for station_id=S1, session_id=A in rows 1, 2",
          "severity": "error"
        }
      ]
    }
    "###);
}

#[test]
fn clean_batch_is_valid() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id,energy_kwh,session_id\nS1,12.34,A\nS1,10,B\n").unwrap();
    let options = ValidationOptions::default();

    let report = evaluate_submission(&registry, &request(&raw, &options), &NoPersistedBatches)
        .unwrap();

    assert_eq!(report.status, SubmissionStatus::Valid);
    assert!(report.verdict.is_compliant);
    assert_eq!(report.verdict.valid_records, 2);
    assert_eq!(report.typed_batch.row_count(), 2);

    let df = report.typed_batch.to_dataframe().unwrap();
    assert_eq!(df.shape(), (2, 3));
}

#[test]
fn lookup_failure_propagates() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id,session_id\nS1,A\n").unwrap();
    let options = ValidationOptions::default();

    let err = evaluate_submission(&registry, &request(&raw, &options), &FailingLookup)
        .unwrap_err();
    assert!(matches!(err, ValidateError::ConstraintLookupFailed { .. }));
    assert_eq!(err.code(), "constraint_lookup_failed");
}

#[test]
fn column_level_errors_skip_the_lookup() {
    let registry = demo_registry();
    let raw = read_batch(b"energy_kwh,session_id\n1.00,A\n").unwrap();
    let options = ValidationOptions::default();

    let report = evaluate_submission(&registry, &request(&raw, &options), &FailingLookup)
        .unwrap();
    assert_eq!(report.status, SubmissionStatus::Invalid);
    assert_eq!(report.verdict.conditions[0].code(), "missing_required_column");
}

#[test]
fn resubmission_does_not_collide_with_itself() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id,session_id\nS1,A\nS2,\n").unwrap();
    let options = ValidationOptions::default();

    let first = validate_dataset(&registry, "demo", ValidationProfile::Baseline, &raw).unwrap();
    let tuples = key_tuples(&["station_id".to_string(), "session_id".to_string()], &first.typed_batch);
    let lookup = InMemoryLookup::new().with_batch("upload-2", tuples.clone());

    let report = evaluate_submission(&registry, &request(&raw, &options), &lookup).unwrap();
    assert_eq!(report.status, SubmissionStatus::Valid);

    let lookup = lookup.with_batch("upload-1", tuples);
    let report = evaluate_submission(&registry, &request(&raw, &options), &lookup).unwrap();
    assert_eq!(report.status, SubmissionStatus::Invalid);
    assert_eq!(report.verdict.conditions.len(), 2);
    assert_eq!(
        report.verdict.conditions[1].error_description,
        "Record station_id=S2 already exists in accepted batch(es) upload-1"
    );
}

#[test]
fn dataset_constraints_resolve_key_from_registry() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id,session_id\nS1,A\nS1,A\nS2,B\n").unwrap();
    let outcome = validate_dataset(&registry, "demo", ValidationProfile::Baseline, &raw).unwrap();
    let options = ValidationOptions::default();

    let conditions = check_dataset_constraints(
        &registry,
        "demo",
        &outcome.typed_batch,
        &NoPersistedBatches,
        None,
        &options,
    )
    .unwrap();
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].header_name, "station_id, session_id");
    assert_eq!(
        conditions[0].error_description,
        "Duplicate records for station_id=S1, session_id=A in rows 1, 2"
    );

    let lookup = InMemoryLookup::new().with_batch(
        "upload-1",
        vec![ConstraintKeyTuple::new([("station_id", "S2"), ("session_id", "B")])],
    );
    let conditions = check_dataset_constraints(
        &registry,
        "demo",
        &outcome.typed_batch,
        &lookup,
        Some("upload-2"),
        &options,
    )
    .unwrap();
    assert_eq!(conditions.len(), 2);
    assert_eq!(
        conditions[1].error_description,
        "Record station_id=S2, session_id=B already exists in accepted batch(es) upload-1"
    );

    let err = check_dataset_constraints(
        &registry,
        "widgets",
        &outcome.typed_batch,
        &NoPersistedBatches,
        None,
        &options,
    )
    .unwrap_err();
    assert_eq!(err.code(), "schema_not_found");
}

#[test]
fn batch_size_bound() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id\nS1\nS2\nS3\n").unwrap();
    let options = ValidationOptions::default().with_max_rows(Some(2));

    let err = evaluate_submission(&registry, &request(&raw, &options), &NoPersistedBatches)
        .unwrap_err();
    assert!(matches!(
        err,
        ValidateError::BatchTooLarge {
            rows: 3,
            max_rows: 2
        }
    ));
}

#[test]
fn unknown_dataset() {
    let registry = demo_registry();
    let raw = read_batch(b"station_id\nS1\n").unwrap();
    let options = ValidationOptions::default();
    let request = SubmissionRequest {
        dataset_id: "widgets",
        batch_id: None,
        options: &options,
        raw: &raw,
    };

    let err = evaluate_submission(&registry, &request, &NoPersistedBatches).unwrap_err();
    assert_eq!(err.code(), "schema_not_found");
}

#[test]
fn embedded_sessions_relaxation_by_profile() {
    let registry = SchemaRegistry::load_embedded().unwrap();
    let raw = read_batch(
        b"station_id,port_id,session_id,session_start,session_end,energy_kwh,power_kw,user_reports_no_data\n\
          S1,P1,A,2024-01-15T08:00:00Z,2024-01-15T09:00:00Z,,,TRUE\n",
    )
    .unwrap();

    let run = |profile| {
        let options = ValidationOptions::default()
            .with_profile(profile)
            .with_all_empty_keys(AllEmptyKeyPolicy::Ignore);
        let request = SubmissionRequest {
            dataset_id: "sessions",
            batch_id: None,
            options: &options,
            raw: &raw,
        };
        evaluate_submission(&registry, &request, &NoPersistedBatches).unwrap()
    };

    let baseline = run(ValidationProfile::Baseline);
    assert_eq!(baseline.status, SubmissionStatus::Invalid);
    assert_eq!(baseline.verdict.error_count(), 2);

    let relaxed = run(ValidationProfile::RelaxedNulls);
    assert_eq!(relaxed.status, SubmissionStatus::Valid);
    assert_eq!(relaxed.verdict.notice_count(), 2);
    assert_eq!(relaxed.verdict.error_count(), 0);
}

#[test]
fn lookup_receives_deduplicated_candidates() {
    use std::cell::RefCell;

    struct Recording(RefCell<Vec<usize>>);

    impl PersistedLookup for Recording {
        fn find_matches(
            &self,
            _key_fields: &[String],
            candidates: &[ConstraintKeyTuple],
            _excluding_batch_id: Option<&str>,
        ) -> Result<LookupMatches, LookupError> {
            self.0.borrow_mut().push(candidates.len());
            Ok(BTreeMap::new())
        }
    }

    let registry = demo_registry();
    let raw = read_batch(b"station_id,session_id\nS1,A\nS1,A\nS2,B\n").unwrap();
    let options = ValidationOptions::default();
    let lookup = Recording(RefCell::new(Vec::new()));

    evaluate_submission(&registry, &request(&raw, &options), &lookup).unwrap();
    assert_eq!(*lookup.0.borrow(), vec![2]);
}

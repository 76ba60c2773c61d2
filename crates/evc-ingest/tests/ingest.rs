use std::io::Write;

use evc_ingest::{IngestError, RECORD_FLAG_COLUMN, read_batch_file, read_batch_file_with_limit};
use tempfile::NamedTempFile;

fn create_temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn reads_batch_from_file() {
    let file = create_temp_csv(
        "station_id,port_id,session_id,user_reports_no_data\n\
         S1,P1,A,FALSE\n\
         S1,P2,,TRUE\n",
    );
    let batch = read_batch_file(file.path()).unwrap();

    assert_eq!(batch.row_count(), 2);
    assert_eq!(batch.column_index(RECORD_FLAG_COLUMN), Some(3));
    assert_eq!(batch.record_flags(), vec![false, true]);
    assert_eq!(batch.column(2), vec!["A", ""]);
}

#[test]
fn duplicate_headers_survive_ingest() {
    let file = create_temp_csv("station_id,energy_kwh,energy_kwh\nS1,1,2\n");
    let batch = read_batch_file(file.path()).unwrap();
    assert_eq!(batch.column_positions("energy_kwh"), vec![1, 2]);
}

#[test]
fn enforces_size_limit() {
    let file = create_temp_csv("station_id\nS1\nS2\nS3\n");
    let err = read_batch_file_with_limit(file.path(), 4).unwrap_err();
    assert!(matches!(err, IngestError::FileTooLarge { max_size: 4, .. }));
    assert!(!err.is_malformed_body());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_batch_file(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn quoted_commas_stay_in_one_cell() {
    let file = create_temp_csv("station_id,error_other\nS1,\"reader fault, restarted\"\n");
    let batch = read_batch_file(file.path()).unwrap();
    assert_eq!(batch.column(1), vec!["reader fault, restarted"]);
}

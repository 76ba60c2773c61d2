use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Outcome of validating one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub is_compliant: bool,
    pub total_records: usize,
    pub valid_records: usize,
    pub rejected_records: usize,
    pub conditions: Vec<Condition>,
}

impl ValidationVerdict {
    /// Derive record counts and compliance from a merged condition list.
    ///
    /// Only error-severity conditions reject records. A row-less error
    /// rejects every record; otherwise each distinct errored row counts once.
    pub fn tally(total_records: usize, conditions: Vec<Condition>) -> Self {
        let mut rows = BTreeSet::new();
        let mut column_level = false;
        for condition in conditions.iter().filter(|c| c.is_error()) {
            match condition.error_row {
                Some(row) => {
                    rows.insert(row);
                }
                None => column_level = true,
            }
        }

        let rejected_records = if column_level {
            total_records
        } else {
            rows.len().min(total_records)
        };
        let is_compliant = !column_level && rows.is_empty();

        Self {
            is_compliant,
            total_records,
            valid_records: total_records - rejected_records,
            rejected_records,
            conditions,
        }
    }

    /// Rebuild this verdict with additional conditions appended.
    #[must_use]
    pub fn merged(self, extra: Vec<Condition>) -> Self {
        let mut conditions = self.conditions;
        conditions.extend(extra);
        Self::tally(self.total_records, conditions)
    }

    pub fn error_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.is_error()).count()
    }

    pub fn notice_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.is_notice()).count()
    }

    pub fn has_column_level_errors(&self) -> bool {
        self.conditions.iter().any(Condition::is_column_level_error)
    }
}

/// Persisted status of a submission, handed to the workflow collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Valid,
    Invalid,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Valid => "Valid",
            SubmissionStatus::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Validation conditions.
//!
//! A [`Condition`] is the wire shape returned to callers. Its description is
//! rendered from a [`ConditionKind`], which carries only the data each
//! finding needs and decides its severity.

use serde::{Deserialize, Serialize};

/// Condition severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Counts toward rejection and blocks compliance.
    Error,
    /// Informational; never rejects a record.
    Notice,
}

/// One `field = value` component of a composite key.
pub type KeyComponent = (String, String);

/// Kind of finding, each variant carrying only its needed data.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    // Batch structure
    EmptyBatch,
    MissingRequiredColumn,
    DuplicateColumn {
        occurrences: usize,
    },
    UnknownColumn,

    // Presence
    RequiredValueMissing,
    /// Required value left empty on a record flagged "no data reported".
    RequiredValueMissingFlagged,

    // String constraints
    StringTooLong {
        max_length: usize,
        actual: usize,
    },
    StringTooShort {
        min_length: usize,
        actual: usize,
    },
    StringLengthMismatch {
        length: usize,
        actual: usize,
    },
    BlankString,

    // Type conversion
    InvalidInteger {
        value: String,
    },
    InvalidDecimal {
        value: String,
    },
    InvalidBoolean {
        value: String,
    },
    InvalidTimestamp {
        value: String,
    },

    // Numeric constraints
    BelowMinimum {
        min_value: f64,
        value: String,
    },
    AboveMaximum {
        max_value: f64,
        value: String,
    },
    DigitCountMismatch {
        length: usize,
        actual: usize,
    },
    DecimalIntegerTooLong {
        max_digits: u32,
        actual: usize,
    },
    DecimalScaleExceeded {
        max_scale: u32,
        actual: usize,
    },

    // Uniqueness constraints
    DuplicateKeyInBatch {
        key: Vec<KeyComponent>,
        rows: Vec<usize>,
    },
    DuplicateKeyAcrossBatches {
        key: Vec<KeyComponent>,
        batch_ids: Vec<String>,
    },
}

impl ConditionKind {
    pub fn severity(&self) -> Severity {
        match self {
            ConditionKind::RequiredValueMissingFlagged => Severity::Notice,
            _ => Severity::Error,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ConditionKind::EmptyBatch => "empty_batch",
            ConditionKind::MissingRequiredColumn => "missing_required_column",
            ConditionKind::DuplicateColumn { .. } => "duplicate_column",
            ConditionKind::UnknownColumn => "unknown_column",
            ConditionKind::RequiredValueMissing => "required_value_missing",
            ConditionKind::RequiredValueMissingFlagged => "required_value_missing_flagged",
            ConditionKind::StringTooLong { .. } => "string_too_long",
            ConditionKind::StringTooShort { .. } => "string_too_short",
            ConditionKind::StringLengthMismatch { .. } => "string_length_mismatch",
            ConditionKind::BlankString => "blank_string",
            ConditionKind::InvalidInteger { .. } => "invalid_integer",
            ConditionKind::InvalidDecimal { .. } => "invalid_decimal",
            ConditionKind::InvalidBoolean { .. } => "invalid_boolean",
            ConditionKind::InvalidTimestamp { .. } => "invalid_timestamp",
            ConditionKind::BelowMinimum { .. } => "below_minimum",
            ConditionKind::AboveMaximum { .. } => "above_maximum",
            ConditionKind::DigitCountMismatch { .. } => "digit_count_mismatch",
            ConditionKind::DecimalIntegerTooLong { .. } => "max_length_exceeded",
            ConditionKind::DecimalScaleExceeded { .. } => "decimal_scale_exceeded",
            ConditionKind::DuplicateKeyInBatch { .. } => "duplicate_key_in_batch",
            ConditionKind::DuplicateKeyAcrossBatches { .. } => "duplicate_key_across_batches",
        }
    }

    /// Render the human-readable description for a finding on `header`.
    pub fn describe(&self, header: &str) -> String {
        match self {
            ConditionKind::EmptyBatch => "Batch contains no data rows".to_string(),
            ConditionKind::MissingRequiredColumn => {
                format!("Required column {} is missing", header)
            }
            ConditionKind::DuplicateColumn { occurrences } => {
                format!("Column {} appears {} times", header, occurrences)
            }
            ConditionKind::UnknownColumn => {
                format!("Column {} is not part of this dataset", header)
            }
            ConditionKind::RequiredValueMissing => {
                format!("Required field {} is missing a value", header)
            }
            ConditionKind::RequiredValueMissingFlagged => format!(
                "Required field {} is empty on a record reported as no data",
                header
            ),
            ConditionKind::StringTooLong { max_length, actual } => format!(
                "Field {} exceeds max length {} (found {})",
                header, max_length, actual
            ),
            ConditionKind::StringTooShort { min_length, actual } => format!(
                "Field {} is shorter than min length {} (found {})",
                header, min_length, actual
            ),
            ConditionKind::StringLengthMismatch { length, actual } => format!(
                "Field {} must be exactly {} characters (found {})",
                header, length, actual
            ),
            ConditionKind::BlankString => {
                format!("Field {} contains only whitespace", header)
            }
            ConditionKind::InvalidInteger { value } => {
                format!("Field {} has invalid integer value '{}'", header, value)
            }
            ConditionKind::InvalidDecimal { value } => {
                format!("Field {} has invalid decimal value '{}'", header, value)
            }
            ConditionKind::InvalidBoolean { value } => format!(
                "Field {} has invalid boolean value '{}' (expected TRUE or FALSE)",
                header, value
            ),
            ConditionKind::InvalidTimestamp { value } => format!(
                "Field {} has invalid timestamp format '{}' (expected YYYY-MM-DDTHH:MM:SSZ)",
                header, value
            ),
            ConditionKind::BelowMinimum { min_value, value } => format!(
                "Field {} value {} is below minimum {}",
                header, value, min_value
            ),
            ConditionKind::AboveMaximum { max_value, value } => format!(
                "Field {} value {} is above maximum {}",
                header, value, max_value
            ),
            ConditionKind::DigitCountMismatch { length, actual } => format!(
                "Field {} must have exactly {} digits (found {})",
                header, length, actual
            ),
            ConditionKind::DecimalIntegerTooLong { max_digits, actual } => format!(
                "Field {} exceeds max length of {} digits before the decimal point (found {})",
                header, max_digits, actual
            ),
            ConditionKind::DecimalScaleExceeded { max_scale, actual } => format!(
                "Field {} exceeds max precision of {} digits after the decimal point (found {})",
                header, max_scale, actual
            ),
            ConditionKind::DuplicateKeyInBatch { key, rows } => {
                let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
                format!(
                    "Duplicate records for {} in rows {}",
                    format_key(key),
                    rows.join(", ")
                )
            }
            ConditionKind::DuplicateKeyAcrossBatches { key, batch_ids } => format!(
                "Record {} already exists in accepted batch(es) {}",
                format_key(key),
                batch_ids.join(", ")
            ),
        }
    }
}

fn format_key(key: &[KeyComponent]) -> String {
    if key.is_empty() {
        return "(all key fields empty)".to_string();
    }
    key.iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single validation finding.
///
/// `error_row` is 1-indexed over data rows; `None` marks a batch- or
/// column-level finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub error_row: Option<usize>,
    pub header_name: String,
    pub error_description: String,
    pub severity: Severity,
    #[serde(skip)]
    pub kind: ConditionKind,
}

impl Condition {
    pub fn new(error_row: Option<usize>, header_name: impl Into<String>, kind: ConditionKind) -> Self {
        let header_name = header_name.into();
        Self {
            error_row,
            error_description: kind.describe(&header_name),
            severity: kind.severity(),
            header_name,
            kind,
        }
    }

    /// Finding on one cell; `row` is the 1-indexed data row.
    pub fn cell(row: usize, header_name: impl Into<String>, kind: ConditionKind) -> Self {
        Self::new(Some(row), header_name, kind)
    }

    /// Finding on a whole column or on the batch.
    pub fn column(header_name: impl Into<String>, kind: ConditionKind) -> Self {
        Self::new(None, header_name, kind)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_notice(&self) -> bool {
        self.severity == Severity::Notice
    }

    /// Column-level error, i.e. an error that cannot be pinned to a row.
    pub fn is_column_level_error(&self) -> bool {
        self.is_error() && self.error_row.is_none()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

//! Field definitions for dataset schemas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Integer,
    Decimal,
    Boolean,
    Timestamp,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Decimal => "decimal",
            Datatype::Boolean => "boolean",
            Datatype::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "str" | "text" => Ok(Datatype::String),
            "integer" | "int" => Ok(Datatype::Integer),
            "decimal" | "numeric" => Ok(Datatype::Decimal),
            "boolean" | "bool" => Ok(Datatype::Boolean),
            "timestamp" | "datetime" => Ok(Datatype::Timestamp),
            _ => Err(format!("Unknown datatype: {}", s)),
        }
    }
}

/// Accepted shape for timestamp fields.
///
/// `Strict` values must match `YYYY-MM-DDTHH:MM:SS[.fraction]Z?` in addition to
/// being parseable. `Legacy` fields only need to be parseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Strict,
    Legacy,
}

impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "strict" => Ok(TimestampFormat::Strict),
            "legacy" => Ok(TimestampFormat::Legacy),
            _ => Err(format!("Unknown timestamp format: {}", s)),
        }
    }
}

/// A single column definition within a dataset schema.
///
/// Definitions are resolved for one validation profile: by the time a
/// `FieldDefinition` reaches a validator, `empty_allowed_when_flagged` already
/// reflects the active profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field_name: String,
    pub datatype: Datatype,
    pub required: bool,
    /// Permits an empty value when the record is flagged "no data reported".
    pub empty_allowed_when_flagged: bool,
    /// Accepts the literal `null` token as an empty value.
    pub nullable: bool,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub max_precision: Option<u32>,
    pub max_scale: Option<u32>,
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
}

impl FieldDefinition {
    /// Create an optional field with no constraints.
    pub fn new(field_name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            field_name: field_name.into(),
            datatype,
            required: false,
            empty_allowed_when_flagged: false,
            nullable: false,
            length: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            max_precision: None,
            max_scale: None,
            timestamp_format: TimestampFormat::Strict,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn empty_when_flagged(mut self) -> Self {
        self.empty_allowed_when_flagged = true;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn with_min_value(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    #[must_use]
    pub fn with_max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Set decimal precision (total digits) and scale (fractional digits).
    #[must_use]
    pub fn with_precision(mut self, max_precision: u32, max_scale: u32) -> Self {
        self.max_precision = Some(max_precision);
        self.max_scale = Some(max_scale);
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Maximum number of integer-part digits for a decimal field, if bounded.
    pub fn max_integer_digits(&self) -> Option<u32> {
        match (self.max_precision, self.max_scale) {
            (Some(precision), Some(scale)) => Some(precision.saturating_sub(scale)),
            (Some(precision), None) => Some(precision),
            _ => None,
        }
    }
}

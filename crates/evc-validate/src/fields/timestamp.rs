//! Timestamp parsing and strict format check.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use evc_model::{ConditionKind, FieldDefinition, TimestampFormat};

use crate::typed::{CellValue, TypedCell, Unconvertible};

/// Shape required of strict timestamp fields: `YYYY-MM-DDTHH:MM:SS[.fraction]Z?`.
static STRICT_TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z?$")
        .expect("Invalid strict timestamp regex")
});

/// Naive date-time layouts accepted by the parser, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

pub(super) fn check(
    definition: &FieldDefinition,
    raw: &str,
    findings: &mut Vec<ConditionKind>,
) -> TypedCell {
    let text = raw.trim();
    let parsed = parse_timestamp(text);

    if parsed.is_none() {
        findings.push(invalid(raw));
    }
    if definition.timestamp_format == TimestampFormat::Strict && !STRICT_TIMESTAMP_REGEX.is_match(text)
    {
        findings.push(invalid(raw));
    }

    match parsed {
        Some(value) => Ok(CellValue::Timestamp(value)),
        None => Err(Unconvertible::new(raw)),
    }
}

fn invalid(raw: &str) -> ConditionKind {
    ConditionKind::InvalidTimestamp {
        value: raw.to_string(),
    }
}

/// Parse an ISO-8601-like instant. Values without an offset are taken as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.with_timezone(&Utc));
    }
    let naive = text.strip_suffix('Z').unwrap_or(text);
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(naive, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|value| value.and_utc())
}

//! Field validators.
//!
//! One handler per [`Datatype`]. Each cell first goes through the shared
//! empty-value policy; only non-empty cells reach the type-specific checks.
//! Conversion failures never abort the column: the cell gets an
//! [`Unconvertible`](crate::typed::Unconvertible) sentinel and validation
//! moves on.

mod boolean;
mod decimal;
mod integer;
mod string;
mod timestamp;

use evc_model::{Condition, ConditionKind, Datatype, FieldDefinition};

use crate::typed::{CellValue, TypedCell, TypedColumn};

/// Conditions and converted cells produced for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome {
    pub conditions: Vec<Condition>,
    pub column: TypedColumn,
}

/// Validate a column of raw values against its field definition.
///
/// `record_flags[i]` tells whether row `i` is flagged "no data reported";
/// missing entries count as unflagged.
pub fn validate_field(
    definition: &FieldDefinition,
    values: &[&str],
    record_flags: &[bool],
) -> FieldOutcome {
    let mut conditions = Vec::new();
    let mut cells = Vec::with_capacity(values.len());
    let mut findings = Vec::new();

    for (idx, raw) in values.iter().enumerate() {
        let flagged = record_flags.get(idx).copied().unwrap_or(false);
        let cell = if is_empty(definition, raw) {
            if let Some(kind) = empty_finding(definition, flagged) {
                findings.push(kind);
            }
            Ok(CellValue::Null)
        } else {
            convert(definition, raw, &mut findings)
        };

        let row = idx + 1;
        conditions.extend(
            findings
                .drain(..)
                .map(|kind| Condition::cell(row, &definition.field_name, kind)),
        );
        cells.push(cell);
    }

    if !conditions.is_empty() {
        tracing::debug!(
            field = %definition.field_name,
            datatype = %definition.datatype,
            conditions = conditions.len(),
            "field validation produced conditions"
        );
    }

    FieldOutcome {
        conditions,
        column: TypedColumn::new(
            definition.field_name.clone(),
            Some(definition.datatype),
            cells,
        ),
    }
}

fn convert(definition: &FieldDefinition, raw: &str, findings: &mut Vec<ConditionKind>) -> TypedCell {
    match definition.datatype {
        Datatype::String => string::check(definition, raw, findings),
        Datatype::Integer => integer::check(definition, raw, findings),
        Datatype::Decimal => decimal::check(definition, raw, findings),
        Datatype::Boolean => boolean::check(raw, findings),
        Datatype::Timestamp => timestamp::check(definition, raw, findings),
    }
}

/// Whether a cell counts as empty for this field.
///
/// String cells are empty only at zero length, so whitespace reaches the
/// blank rule. Other types trim first. A `null` token is empty only on
/// nullable fields.
fn is_empty(definition: &FieldDefinition, raw: &str) -> bool {
    let empty = match definition.datatype {
        Datatype::String => raw.is_empty(),
        _ => raw.trim().is_empty(),
    };
    empty || (definition.nullable && raw.trim().eq_ignore_ascii_case("null"))
}

fn empty_finding(definition: &FieldDefinition, flagged: bool) -> Option<ConditionKind> {
    if !definition.required {
        None
    } else if flagged && definition.empty_allowed_when_flagged {
        Some(ConditionKind::RequiredValueMissingFlagged)
    } else {
        Some(ConditionKind::RequiredValueMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_model::Severity;

    fn codes(outcome: &FieldOutcome) -> Vec<(Option<usize>, &'static str)> {
        outcome
            .conditions
            .iter()
            .map(|c| (c.error_row, c.code()))
            .collect()
    }

    #[test]
    fn test_optional_empty_is_skipped() {
        let definition = FieldDefinition::new("error_code", Datatype::Integer);
        let outcome = validate_field(&definition, &["", "  "], &[]);
        assert!(outcome.conditions.is_empty());
        assert_eq!(outcome.column.cells, vec![Ok(CellValue::Null), Ok(CellValue::Null)]);
    }

    #[test]
    fn test_required_empty_with_and_without_relaxation() {
        let definition = FieldDefinition::new("energy_kwh", Datatype::Decimal)
            .required()
            .empty_when_flagged();
        let outcome = validate_field(&definition, &["", ""], &[true, false]);

        assert_eq!(outcome.conditions.len(), 2);
        assert_eq!(outcome.conditions[0].error_row, Some(1));
        assert_eq!(outcome.conditions[0].severity, Severity::Notice);
        assert_eq!(outcome.conditions[1].error_row, Some(2));
        assert_eq!(outcome.conditions[1].severity, Severity::Error);
    }

    #[test]
    fn test_flag_without_relaxation_is_an_error() {
        let definition = FieldDefinition::new("station_id", Datatype::String).required();
        let outcome = validate_field(&definition, &[""], &[true]);
        assert_eq!(codes(&outcome), vec![(Some(1), "required_value_missing")]);
    }

    #[test]
    fn test_null_token_depends_on_nullable() {
        let strict = FieldDefinition::new("ports_installed", Datatype::Integer);
        let outcome = validate_field(&strict, &["null"], &[]);
        assert_eq!(codes(&outcome), vec![(Some(1), "invalid_integer")]);

        let nullable = strict.clone().nullable();
        let outcome = validate_field(&nullable, &["null", "NULL"], &[]);
        assert!(outcome.conditions.is_empty());

        let required = nullable.required();
        let outcome = validate_field(&required, &["null"], &[]);
        assert_eq!(codes(&outcome), vec![(Some(1), "required_value_missing")]);
    }

    #[test]
    fn test_every_row_is_checked() {
        let definition = FieldDefinition::new("is_working", Datatype::Boolean).required();
        let outcome = validate_field(&definition, &["yes", "TRUE", "", "no"], &[]);
        assert_eq!(
            codes(&outcome),
            vec![
                (Some(1), "invalid_boolean"),
                (Some(3), "required_value_missing"),
                (Some(4), "invalid_boolean"),
            ]
        );
        assert_eq!(outcome.column.cells.len(), 4);
        assert_eq!(outcome.column.unconvertible_count(), 2);
    }
}

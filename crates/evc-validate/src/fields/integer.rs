//! Integer parsing with range and digit-count checks.

use rust_decimal::Decimal;

use evc_model::{ConditionKind, FieldDefinition};

use super::decimal::{check_range, parse_decimal};
use crate::typed::{CellValue, TypedCell, Unconvertible};

pub(super) fn check(
    definition: &FieldDefinition,
    raw: &str,
    findings: &mut Vec<ConditionKind>,
) -> TypedCell {
    let text = raw.trim();
    let Some(digits) = integer_digits(text) else {
        findings.push(ConditionKind::InvalidInteger {
            value: raw.to_string(),
        });
        return Err(Unconvertible::new(raw));
    };

    // Integers beyond i64 are still integers: keep them exact as decimals
    // when they fit, otherwise carry the raw text.
    let cell = match text.parse::<i64>() {
        Ok(value) => {
            check_range(definition, &Decimal::from(value), text, findings);
            Ok(CellValue::Integer(value))
        }
        Err(_) => match parse_decimal(text) {
            Some(value) => {
                check_range(definition, &value, text, findings);
                Ok(CellValue::Decimal(value))
            }
            None => {
                check_unbounded_range(definition, text, findings);
                Err(Unconvertible::new(raw))
            }
        },
    };

    if let Some(length) = definition.length
        && digits != length
    {
        findings.push(ConditionKind::DigitCountMismatch {
            length,
            actual: digits,
        });
    }

    cell
}

/// Digit count of a base-10 integer literal with an optional sign, or
/// `None` when the text is not one. Leading zeros are not counted.
fn integer_digits(text: &str) -> Option<usize> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(unsigned.trim_start_matches('0').len().max(1))
}

/// Range check for literals too long for any numeric type: such a value lies
/// beyond every finite bound on its side of zero.
fn check_unbounded_range(
    definition: &FieldDefinition,
    text: &str,
    findings: &mut Vec<ConditionKind>,
) {
    if text.starts_with('-') {
        if let Some(min_value) = definition.min_value {
            findings.push(ConditionKind::BelowMinimum {
                min_value,
                value: text.to_string(),
            });
        }
    } else if let Some(max_value) = definition.max_value {
        findings.push(ConditionKind::AboveMaximum {
            max_value,
            value: text.to_string(),
        });
    }
}

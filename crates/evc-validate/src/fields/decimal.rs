//! Decimal parsing with precision, scale and range checks.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use evc_model::{ConditionKind, FieldDefinition};

use crate::typed::{CellValue, TypedCell, Unconvertible};

pub(super) fn check(
    definition: &FieldDefinition,
    raw: &str,
    findings: &mut Vec<ConditionKind>,
) -> TypedCell {
    let text = raw.trim();
    let Some(value) = parse_decimal(text) else {
        findings.push(ConditionKind::InvalidDecimal {
            value: raw.to_string(),
        });
        return Err(Unconvertible::new(raw));
    };

    let (integer_digits, fraction_digits) = digit_counts(&value);

    if let Some(max_digits) = definition.max_integer_digits()
        && integer_digits > max_digits as usize
    {
        findings.push(ConditionKind::DecimalIntegerTooLong {
            max_digits,
            actual: integer_digits,
        });
    }
    if let Some(max_scale) = definition.max_scale
        && fraction_digits > max_scale as usize
    {
        findings.push(ConditionKind::DecimalScaleExceeded {
            max_scale,
            actual: fraction_digits,
        });
    }

    check_range(definition, &value, text, findings);
    Ok(CellValue::Decimal(value))
}

/// Exact parse; exponent notation is expanded. Values that would need
/// rounding to fit are rejected, as are digit-group underscores.
pub(super) fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        None
    } else if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str_exact(text).ok()
    }
}

/// Shared `min_value`/`max_value` check for numeric fields.
pub(super) fn check_range(
    definition: &FieldDefinition,
    value: &Decimal,
    text: &str,
    findings: &mut Vec<ConditionKind>,
) {
    if let Some(min_value) = definition.min_value
        && compare_to_bound(value, min_value) == Some(Ordering::Less)
    {
        findings.push(ConditionKind::BelowMinimum {
            min_value,
            value: text.to_string(),
        });
    }
    if let Some(max_value) = definition.max_value
        && compare_to_bound(value, max_value) == Some(Ordering::Greater)
    {
        findings.push(ConditionKind::AboveMaximum {
            max_value,
            value: text.to_string(),
        });
    }
}

/// Bounds are declared as `f64`; compare exactly when the bound fits a
/// `Decimal`, otherwise in floating point.
fn compare_to_bound(value: &Decimal, bound: f64) -> Option<Ordering> {
    match Decimal::from_f64(bound) {
        Some(bound) => Some(value.cmp(&bound)),
        None => value.to_f64().and_then(|value| value.partial_cmp(&bound)),
    }
}

/// Integer-part and fractional-part digit counts.
///
/// The sign and leading zeros of the integer part are not counted. Trailing
/// fractional zeros are, since they were submitted.
fn digit_counts(value: &Decimal) -> (usize, usize) {
    let scale = value.scale();
    let integer_part = value.mantissa().unsigned_abs() / 10u128.pow(scale);
    let integer_digits = if integer_part == 0 {
        0
    } else {
        integer_part.to_string().len()
    };
    (integer_digits, scale as usize)
}

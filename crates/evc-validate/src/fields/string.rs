//! String length and blank checks.

use evc_model::{ConditionKind, FieldDefinition};

use crate::typed::{CellValue, TypedCell};

pub(super) fn check(
    definition: &FieldDefinition,
    raw: &str,
    findings: &mut Vec<ConditionKind>,
) -> TypedCell {
    let actual = raw.chars().count();

    if let Some(max_length) = definition.max_length
        && actual > max_length
    {
        findings.push(ConditionKind::StringTooLong { max_length, actual });
    }
    if let Some(min_length) = definition.min_length
        && actual < min_length
    {
        findings.push(ConditionKind::StringTooShort { min_length, actual });
    }
    if let Some(length) = definition.length
        && actual != length
    {
        findings.push(ConditionKind::StringLengthMismatch { length, actual });
    }
    if definition.required && raw.trim().is_empty() {
        findings.push(ConditionKind::BlankString);
    }

    Ok(CellValue::String(raw.to_string()))
}

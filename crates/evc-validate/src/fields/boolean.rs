use evc_model::ConditionKind;

use crate::typed::{CellValue, TypedCell, Unconvertible};

/// Accepts `TRUE` or `FALSE` in any case.
pub(super) fn check(raw: &str, findings: &mut Vec<ConditionKind>) -> TypedCell {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("true") {
        Ok(CellValue::Boolean(true))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(CellValue::Boolean(false))
    } else {
        findings.push(ConditionKind::InvalidBoolean {
            value: raw.to_string(),
        });
        Err(Unconvertible::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_literals() {
        let mut findings = Vec::new();
        assert_eq!(check("True", &mut findings), Ok(CellValue::Boolean(true)));
        assert_eq!(check("false", &mut findings), Ok(CellValue::Boolean(false)));
        assert!(findings.is_empty());

        for raw in ["1", "yes", "T"] {
            assert!(check(raw, &mut findings).is_err());
        }
        assert_eq!(findings.len(), 3);
    }
}

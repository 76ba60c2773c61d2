//! Submission status resolution.

use evc_model::{Condition, SubmissionStatus, ValidationVerdict};

/// Map a verdict and the constraint findings onto a submission status.
///
/// Any constraint condition makes the submission invalid, even if the
/// verdict itself is compliant.
pub fn resolve_status(
    verdict: &ValidationVerdict,
    constraint_conditions: &[Condition],
) -> SubmissionStatus {
    if verdict.is_compliant && constraint_conditions.is_empty() {
        SubmissionStatus::Valid
    } else {
        SubmissionStatus::Invalid
    }
}

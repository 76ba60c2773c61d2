//! Validation profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which "empty when flagged" relaxations are active for a dataset.
///
/// Relaxations roll out per dataset over time. Each profile is a fixed
/// snapshot of those rules, so resolving a schema is a pure function of
/// `(dataset, profile)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationProfile {
    /// Only relaxations that have always applied.
    #[default]
    Baseline,
    /// Baseline plus the relaxed-null rules for measurement fields.
    RelaxedNulls,
}

impl ValidationProfile {
    pub const ALL: [ValidationProfile; 2] =
        [ValidationProfile::Baseline, ValidationProfile::RelaxedNulls];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationProfile::Baseline => "baseline",
            ValidationProfile::RelaxedNulls => "relaxed-nulls",
        }
    }
}

impl fmt::Display for ValidationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "baseline" => Ok(ValidationProfile::Baseline),
            "relaxed-nulls" | "relaxed" => Ok(ValidationProfile::RelaxedNulls),
            _ => Err(format!("Unknown validation profile: {}", s)),
        }
    }
}

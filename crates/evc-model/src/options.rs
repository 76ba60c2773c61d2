//! Configuration options for batch validation.

use serde::{Deserialize, Serialize};

use crate::profile::ValidationProfile;

/// How records whose composite key is entirely empty are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllEmptyKeyPolicy {
    /// All-empty keys compare equal to each other and are reported as duplicates.
    #[default]
    Group,
    /// All-empty keys never participate in duplicate detection.
    Ignore,
}

/// Options controlling a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Relaxation rules used to resolve the dataset schema.
    pub profile: ValidationProfile,

    /// Treatment of records with no non-empty key component.
    pub all_empty_keys: AllEmptyKeyPolicy,

    /// Reject batches with more data rows than this before validating.
    pub max_rows: Option<usize>,
}

impl ValidationOptions {
    #[must_use]
    pub fn with_profile(mut self, profile: ValidationProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn with_all_empty_keys(mut self, policy: AllEmptyKeyPolicy) -> Self {
        self.all_empty_keys = policy;
        self
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }
}

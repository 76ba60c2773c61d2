//! TOML configuration file.
//!
//! ```toml
//! standards_dir = "standards"
//!
//! [validation]
//! profile = "relaxed-nulls"
//! all_empty_keys = "ignore"
//! max_rows = 50000
//! ```
//!
//! Command-line flags take precedence over file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use evc_model::ValidationOptions;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory holding `datasets.csv` and `fields.csv`.
    pub standards_dir: Option<PathBuf>,
    pub validation: ValidationOptions,
}

impl CliConfig {
    /// Load from `path`; a missing path argument yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_model::{AllEmptyKeyPolicy, ValidationProfile};

    #[test]
    fn test_parse_validation_table() {
        let config: CliConfig = toml::from_str(
            r#"
            [validation]
            profile = "relaxed-nulls"
            all_empty_keys = "ignore"
            max_rows = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.profile, ValidationProfile::RelaxedNulls);
        assert_eq!(config.validation.all_empty_keys, AllEmptyKeyPolicy::Ignore);
        assert_eq!(config.validation.max_rows, Some(10));
        assert_eq!(config.standards_dir, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<CliConfig>("strict = true").is_err());
    }
}

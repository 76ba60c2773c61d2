//! Schema registry.
//!
//! Loaded once and read-only afterwards. Every `(dataset, profile)` pair is
//! resolved at load time, so lookups are plain map reads and can be shared
//! across threads without locking.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use evc_model::{DatasetSchema, ValidationProfile};

use crate::embedded;
use crate::error::{Result, StandardsError};
use crate::loader::{DatasetInfo, DatasetSpec, parse_tables};

/// Environment variable that points the registry at an external standards directory.
pub const STANDARDS_ENV_VAR: &str = "EVC_STANDARDS_DIR";

#[derive(Debug)]
struct DatasetEntry {
    info: DatasetInfo,
    schemas: BTreeMap<ValidationProfile, DatasetSchema>,
}

/// Registry of dataset schemas, keyed by lowercase dataset id.
#[derive(Debug)]
pub struct SchemaRegistry {
    datasets: BTreeMap<String, DatasetEntry>,
}

static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();

impl SchemaRegistry {
    /// Load the embedded dataset catalog.
    pub fn load_embedded() -> Result<Self> {
        let specs = parse_tables(
            embedded::DATASETS,
            embedded::DATASETS_FILE,
            embedded::FIELDS,
            embedded::FIELDS_FILE,
        )?;
        Ok(Self::from_specs(specs))
    }

    /// Load `datasets.csv` and `fields.csv` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(StandardsError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        let datasets_path = dir.join(embedded::DATASETS_FILE);
        let fields_path = dir.join(embedded::FIELDS_FILE);
        let datasets = read_file(&datasets_path)?;
        let fields = read_file(&fields_path)?;
        let specs = parse_tables(
            &datasets,
            &datasets_path.display().to_string(),
            &fields,
            &fields_path.display().to_string(),
        )?;
        tracing::info!(path = %dir.display(), datasets = specs.len(), "loaded standards directory");
        Ok(Self::from_specs(specs))
    }

    /// Load from `dir` when given, else from [`STANDARDS_ENV_VAR`], else the embedded tables.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            return Self::load_from_dir(dir);
        }
        match std::env::var_os(STANDARDS_ENV_VAR) {
            Some(root) => Self::load_from_dir(&PathBuf::from(root)),
            None => Self::load_embedded(),
        }
    }

    /// Process-wide registry built from the embedded tables on first use.
    pub fn global() -> Result<&'static Self> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }
        let registry = Self::load_embedded()?;
        Ok(GLOBAL.get_or_init(|| registry))
    }

    /// Build a registry from already-parsed dataset specs.
    pub fn from_specs(specs: Vec<DatasetSpec>) -> Self {
        let mut datasets = BTreeMap::new();
        for spec in specs {
            let schemas = ValidationProfile::ALL
                .iter()
                .map(|&profile| {
                    let fields = spec.fields.iter().map(|f| f.resolve(profile)).collect();
                    let schema = DatasetSchema::new(
                        spec.info.dataset_id.clone(),
                        profile,
                        fields,
                        spec.info.unique_key_fields.clone(),
                    );
                    (profile, schema)
                })
                .collect();
            datasets.insert(
                spec.info.dataset_id.to_lowercase(),
                DatasetEntry {
                    info: spec.info,
                    schemas,
                },
            );
        }
        Self { datasets }
    }

    /// Resolve the schema for a dataset under a validation profile.
    pub fn get_schema(
        &self,
        dataset_id: &str,
        profile: ValidationProfile,
    ) -> Result<&DatasetSchema> {
        self.datasets
            .get(&dataset_id.trim().to_lowercase())
            .and_then(|entry| entry.schemas.get(&profile))
            .ok_or_else(|| StandardsError::SchemaNotFound {
                dataset_id: dataset_id.to_string(),
                profile,
            })
    }

    /// Metadata for every registered dataset, ordered by id.
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetInfo> {
        self.datasets.values().map(|entry| &entry.info)
    }

    pub fn find_dataset(&self, dataset_id: &str) -> Option<&DatasetInfo> {
        self.datasets
            .get(&dataset_id.trim().to_lowercase())
            .map(|entry| &entry.info)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| StandardsError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

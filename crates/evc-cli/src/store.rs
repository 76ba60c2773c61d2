//! Directory-backed store of accepted batches.
//!
//! Layout: `<root>/<dataset_id>/<batch_id>.csv`. Each file holds the canonical
//! projection of a batch that resolved `Valid`. The store doubles as the
//! persisted lookup: stored files are re-read, re-validated against the
//! same schema and reduced to key tuples on every lookup.

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use polars::prelude::{CsvWriter, SerWriter};

use evc_ingest::read_batch_file;
use evc_model::DatasetSchema;
use evc_validate::{
    ConstraintKeyTuple, LookupError, LookupMatches, PersistedLookup, TypedBatch, key_tuples,
    match_stored, validate_batch,
};

const BATCH_EXTENSION: &str = "csv";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dataset_dir(&self, dataset_id: &str) -> PathBuf {
        self.root.join(dataset_id.to_lowercase())
    }

    pub fn batch_path(&self, dataset_id: &str, batch_id: &str) -> PathBuf {
        self.dataset_dir(dataset_id)
            .join(format!("{batch_id}.{BATCH_EXTENSION}"))
    }

    /// Ids of accepted batches for a dataset, sorted.
    pub fn batch_ids(&self, dataset_id: &str) -> std::io::Result<Vec<String>> {
        let dir = self.dataset_dir(dataset_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BATCH_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Write an accepted batch, replacing an earlier copy with the same id.
    pub fn accept(&self, dataset_id: &str, batch_id: &str, batch: &TypedBatch) -> Result<PathBuf> {
        validate_batch_id(batch_id)?;
        let dir = self.dataset_dir(dataset_id);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

        let path = self.batch_path(dataset_id, batch_id);
        let mut df = batch.to_canonical_dataframe().context("build canonical frame")?;
        let mut file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("write {}", path.display()))?;

        tracing::info!(dataset = dataset_id, batch_id, rows = df.height(), "batch accepted");
        Ok(path)
    }

    /// Lookup over this store's batches for one dataset schema.
    pub fn lookup<'a>(&'a self, schema: &'a DatasetSchema) -> StoreLookup<'a> {
        StoreLookup {
            store: self,
            schema,
        }
    }
}

/// [`PersistedLookup`] reading a [`DirectoryStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreLookup<'a> {
    store: &'a DirectoryStore,
    schema: &'a DatasetSchema,
}

impl StoreLookup<'_> {
    fn stored_tuples(&self, key_fields: &[String], batch_id: &str) -> Result<Vec<ConstraintKeyTuple>, LookupError> {
        let path = self.store.batch_path(&self.schema.dataset_id, batch_id);
        let raw = read_batch_file(&path)?;
        let outcome = validate_batch(self.schema, &raw);
        Ok(key_tuples(key_fields, &outcome.typed_batch))
    }
}

impl PersistedLookup for StoreLookup<'_> {
    fn find_matches(
        &self,
        key_fields: &[String],
        candidates: &[ConstraintKeyTuple],
        excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError> {
        let mut stored = Vec::new();
        for batch_id in self.store.batch_ids(&self.schema.dataset_id)? {
            if Some(batch_id.as_str()) == excluding_batch_id {
                continue;
            }
            let tuples = self.stored_tuples(key_fields, &batch_id)?;
            stored.push((batch_id, tuples));
        }
        tracing::debug!(
            dataset = %self.schema.dataset_id,
            batches = stored.len(),
            candidates = candidates.len(),
            "searching accepted batches"
        );
        Ok(match_stored(
            stored
                .iter()
                .map(|(batch_id, tuples)| (batch_id.as_str(), tuples.as_slice())),
            candidates,
            excluding_batch_id,
        ))
    }
}

/// Batch ids become file names: keep them to a safe character set.
fn validate_batch_id(batch_id: &str) -> Result<()> {
    let valid = !batch_id.is_empty()
        && !batch_id.starts_with('.')
        && batch_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        bail!("invalid batch id '{batch_id}': use letters, digits, '-', '_' or '.'");
    }
    Ok(())
}

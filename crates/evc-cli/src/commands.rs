use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;
use serde::Serialize;
use tracing::{info_span, trace};

use evc_cli::config::CliConfig;
use evc_cli::logging::redact_value;
use evc_cli::store::DirectoryStore;
use evc_ingest::{MAX_BATCH_FILE_SIZE, content_fingerprint, read_batch, read_bytes_with_limit};
use evc_model::{SubmissionStatus, ValidationOptions};
use evc_standards::SchemaRegistry;
use evc_validate::{NoPersistedBatches, SubmissionReport, SubmissionRequest, evaluate_submission};

use crate::cli::ValidateArgs;
use crate::summary::apply_table_style;

/// Hex characters of the content hash used as the default batch id.
const DEFAULT_BATCH_ID_LEN: usize = 16;

/// Result of one `validate` invocation.
#[derive(Debug, Serialize)]
pub struct ValidateRun {
    pub dataset: String,
    pub batch_id: String,
    #[serde(flatten)]
    pub report: SubmissionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<PathBuf>,
}

impl ValidateRun {
    pub fn is_valid(&self) -> bool {
        self.report.status == SubmissionStatus::Valid
    }
}

pub fn run_datasets(config: &CliConfig) -> Result<()> {
    let registry = SchemaRegistry::load(config.standards_dir.as_deref()).context("load standards")?;
    let mut table = Table::new();
    table.set_header(vec!["Dataset", "Name", "Unique key", "Description"]);
    apply_table_style(&mut table);
    for info in registry.datasets() {
        table.add_row(vec![
            info.dataset_id.clone(),
            info.name.clone(),
            info.unique_key_fields.join(", "),
            info.description.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_validate(config: &CliConfig, args: &ValidateArgs) -> Result<ValidateRun> {
    let registry = SchemaRegistry::load(config.standards_dir.as_deref()).context("load standards")?;
    let options = resolve_options(&config.validation, args);

    let bytes = read_bytes_with_limit(&args.file, MAX_BATCH_FILE_SIZE)
        .with_context(|| format!("read {}", args.file.display()))?;
    let batch_id = args
        .batch_id
        .clone()
        .unwrap_or_else(|| content_fingerprint(&bytes)[..DEFAULT_BATCH_ID_LEN].to_string());

    let span = info_span!("validate", dataset = %args.dataset, batch_id = %batch_id);
    let _guard = span.enter();

    let raw = read_batch(&bytes).with_context(|| format!("parse {}", args.file.display()))?;
    let request = SubmissionRequest {
        dataset_id: &args.dataset,
        batch_id: Some(batch_id.as_str()),
        options: &options,
        raw: &raw,
    };

    let store = args.store.as_ref().map(DirectoryStore::new);
    let report = match &store {
        Some(store) => {
            let schema = registry
                .get_schema(&args.dataset, options.profile)
                .context("resolve dataset schema")?;
            evaluate_submission(&registry, &request, &store.lookup(schema))
        }
        None => evaluate_submission(&registry, &request, &NoPersistedBatches),
    }
    .context("evaluate submission")?;

    for condition in &report.verdict.conditions {
        trace!(
            row = ?condition.error_row,
            header = %condition.header_name,
            code = condition.code(),
            description = redact_value(&condition.error_description),
            "condition"
        );
    }

    let accepted = match &store {
        Some(store) if args.accept && report.status == SubmissionStatus::Valid => Some(
            store
                .accept(&args.dataset, &batch_id, &report.typed_batch)
                .context("store accepted batch")?,
        ),
        _ => None,
    };

    Ok(ValidateRun {
        dataset: args.dataset.clone(),
        batch_id,
        report,
        accepted,
    })
}

/// Command-line values win over the configuration file.
fn resolve_options(base: &ValidationOptions, args: &ValidateArgs) -> ValidationOptions {
    let mut options = base.clone();
    if let Some(profile) = args.profile {
        options = options.with_profile(profile.into());
    }
    if let Some(policy) = args.all_empty_keys {
        options = options.with_all_empty_keys(policy.into());
    }
    if args.max_rows.is_some() {
        options = options.with_max_rows(args.max_rows);
    }
    options
}

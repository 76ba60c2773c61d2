//! Field table parsing.
//!
//! A schema source is two CSV tables: `datasets.csv` (one row per dataset,
//! with its composite key) and `fields.csv` (one row per field, in
//! declaration order). Rows are read into string maps first and converted
//! column by column so that errors name the offending column and value.

use std::collections::{BTreeMap, BTreeSet};

use csv::ReaderBuilder;
use evc_model::{Datatype, FieldDefinition, TimestampFormat, ValidationProfile};

use crate::error::{Result, StandardsError};

/// Separator between key field names in `datasets.csv`.
const KEY_SEPARATOR: char = '|';

/// When a field may be left empty on a record flagged "no data reported".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagRelaxation {
    /// Never; a flagged record still needs a value.
    #[default]
    Never,
    /// Under every profile.
    Baseline,
    /// Only under [`ValidationProfile::RelaxedNulls`].
    Relaxed,
}

impl FlagRelaxation {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "never" | "no" => Some(Self::Never),
            "baseline" | "always" => Some(Self::Baseline),
            "relaxed" => Some(Self::Relaxed),
            _ => None,
        }
    }

    /// Whether the relaxation is granted under `profile`.
    pub fn grants(self, profile: ValidationProfile) -> bool {
        match self {
            Self::Never => false,
            Self::Baseline => true,
            Self::Relaxed => profile == ValidationProfile::RelaxedNulls,
        }
    }
}

/// Descriptive metadata for a registered dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub dataset_id: String,
    pub name: String,
    pub description: String,
    pub unique_key_fields: Vec<String>,
}

/// A field row before profile resolution.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub definition: FieldDefinition,
    pub relaxation: FlagRelaxation,
}

impl FieldSpec {
    /// Produce the definition seen by validators under `profile`.
    pub fn resolve(&self, profile: ValidationProfile) -> FieldDefinition {
        FieldDefinition {
            empty_allowed_when_flagged: self.relaxation.grants(profile),
            ..self.definition.clone()
        }
    }
}

/// A dataset with its unresolved field table.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub info: DatasetInfo,
    pub fields: Vec<FieldSpec>,
}

/// Parse the dataset and field tables into dataset specs.
///
/// `datasets_label` and `fields_label` name the sources in error messages.
pub fn parse_tables(
    datasets_csv: &str,
    datasets_label: &str,
    fields_csv: &str,
    fields_label: &str,
) -> Result<Vec<DatasetSpec>> {
    let dataset_rows = read_csv_rows(datasets_csv, datasets_label)?;
    let field_rows = read_csv_rows(fields_csv, fields_label)?;

    let mut grouped: BTreeMap<String, Vec<FieldSpec>> = BTreeMap::new();
    for row in &field_rows {
        let dataset_id = column(row, "dataset_id").to_lowercase();
        if dataset_id.is_empty() {
            continue;
        }
        let spec = parse_field_row(row, fields_label)?;
        let fields = grouped.entry(dataset_id.clone()).or_default();
        if fields
            .iter()
            .any(|f| f.definition.field_name == spec.definition.field_name)
        {
            return Err(StandardsError::DuplicateField {
                dataset_id,
                field_name: spec.definition.field_name,
            });
        }
        fields.push(spec);
    }

    let mut datasets = Vec::new();
    for row in &dataset_rows {
        let dataset_id = column(row, "dataset_id").to_lowercase();
        if dataset_id.is_empty() {
            continue;
        }
        let fields = grouped.remove(&dataset_id).unwrap_or_default();
        let unique_key_fields: Vec<String> = column(row, "unique_key")
            .split(KEY_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();

        let declared: BTreeSet<&str> = fields
            .iter()
            .map(|f| f.definition.field_name.as_str())
            .collect();
        if let Some(missing) = unique_key_fields
            .iter()
            .find(|name| !declared.contains(name.as_str()))
        {
            return Err(StandardsError::UnknownKeyField {
                dataset_id,
                field_name: missing.clone(),
            });
        }

        datasets.push(DatasetSpec {
            info: DatasetInfo {
                name: column(row, "name").to_string(),
                description: column(row, "description").to_string(),
                dataset_id,
                unique_key_fields,
            },
            fields,
        });
    }

    for orphan in grouped.keys() {
        tracing::warn!(dataset = %orphan, "field table references undeclared dataset");
    }

    Ok(datasets)
}

fn read_csv_rows(source: &str, label: &str) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source.as_bytes());
    let headers = reader
        .headers()
        .map_err(|source| StandardsError::CsvRead {
            file: label.to_string(),
            source,
        })?
        .clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StandardsError::CsvRead {
            file: label.to_string(),
            source,
        })?;
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers
                .get(idx)
                .unwrap_or("")
                .trim_matches('\u{feff}')
                .trim()
                .to_string();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

fn column<'a>(row: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    row.get(name).map(String::as_str).unwrap_or("")
}

fn parse_field_row(row: &BTreeMap<String, String>, file: &str) -> Result<FieldSpec> {
    let invalid = |field: &'static str, value: &str| StandardsError::InvalidValue {
        field,
        value: value.to_string(),
        file: file.to_string(),
    };

    let field_name = column(row, "field_name");
    if field_name.is_empty() {
        return Err(invalid("field_name", field_name));
    }
    let raw_type = column(row, "datatype");
    let datatype: Datatype = raw_type.parse().map_err(|_| invalid("datatype", raw_type))?;

    let raw_relaxation = column(row, "flag_relaxation");
    let relaxation =
        FlagRelaxation::parse(raw_relaxation).ok_or_else(|| invalid("flag_relaxation", raw_relaxation))?;

    let raw_format = column(row, "timestamp_format");
    let timestamp_format: TimestampFormat = raw_format
        .parse()
        .map_err(|_| invalid("timestamp_format", raw_format))?;

    let definition = FieldDefinition {
        required: parse_flag(row, "required", file)?,
        nullable: parse_flag(row, "nullable", file)?,
        length: parse_optional(row, "length", file)?,
        min_length: parse_optional(row, "min_length", file)?,
        max_length: parse_optional(row, "max_length", file)?,
        min_value: parse_optional(row, "min_value", file)?,
        max_value: parse_optional(row, "max_value", file)?,
        max_precision: parse_optional(row, "max_precision", file)?,
        max_scale: parse_optional(row, "max_scale", file)?,
        timestamp_format,
        ..FieldDefinition::new(field_name, datatype)
    };

    Ok(FieldSpec {
        definition,
        relaxation,
    })
}

fn parse_flag(row: &BTreeMap<String, String>, name: &'static str, file: &str) -> Result<bool> {
    let raw = column(row, name);
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "" | "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(StandardsError::InvalidValue {
            field: name,
            value: raw.to_string(),
            file: file.to_string(),
        }),
    }
}

fn parse_optional<T: std::str::FromStr>(
    row: &BTreeMap<String, String>,
    name: &'static str,
    file: &str,
) -> Result<Option<T>> {
    let raw = column(row, name);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| StandardsError::InvalidValue {
            field: name,
            value: raw.to_string(),
            file: file.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASETS: &str = "dataset_id,name,description,unique_key\n\
                            demo,Demo,Demo dataset,a|b\n";

    #[test]
    fn parses_fields_in_order() {
        let fields = "dataset_id,field_name,datatype,required,nullable,flag_relaxation,length,min_length,max_length,min_value,max_value,max_precision,max_scale,timestamp_format\n\
                      demo,a,string,true,false,,,,10,,,,,\n\
                      demo,b,decimal,false,false,relaxed,,,,0,,11,2,\n";
        let datasets = parse_tables(DATASETS, "datasets.csv", fields, "fields.csv").unwrap();
        assert_eq!(datasets.len(), 1);

        let demo = &datasets[0];
        assert_eq!(demo.info.unique_key_fields, vec!["a", "b"]);
        assert_eq!(demo.fields[0].definition.max_length, Some(10));
        assert!(demo.fields[0].definition.required);
        assert_eq!(demo.fields[1].definition.max_precision, Some(11));
        assert_eq!(demo.fields[1].relaxation, FlagRelaxation::Relaxed);
    }

    #[test]
    fn relaxation_depends_on_profile() {
        assert!(!FlagRelaxation::Relaxed.grants(ValidationProfile::Baseline));
        assert!(FlagRelaxation::Relaxed.grants(ValidationProfile::RelaxedNulls));
        assert!(FlagRelaxation::Baseline.grants(ValidationProfile::Baseline));
        assert!(!FlagRelaxation::Never.grants(ValidationProfile::RelaxedNulls));
    }

    #[test]
    fn rejects_unknown_datatype() {
        let fields = "dataset_id,field_name,datatype\ndemo,a,blob\n";
        let err = parse_tables(DATASETS, "datasets.csv", fields, "fields.csv").unwrap_err();
        assert!(matches!(
            err,
            StandardsError::InvalidValue {
                field: "datatype",
                ..
            }
        ));
    }

    #[test]
    fn rejects_key_on_undeclared_field() {
        let fields = "dataset_id,field_name,datatype\ndemo,a,string\n";
        let err = parse_tables(DATASETS, "datasets.csv", fields, "fields.csv").unwrap_err();
        assert!(matches!(err, StandardsError::UnknownKeyField { .. }));
    }

    #[test]
    fn rejects_duplicate_field() {
        let fields = "dataset_id,field_name,datatype\ndemo,a,string\ndemo,a,integer\n";
        let err = parse_tables(DATASETS, "datasets.csv", fields, "fields.csv").unwrap_err();
        assert!(matches!(err, StandardsError::DuplicateField { .. }));
    }
}

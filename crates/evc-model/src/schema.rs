use std::collections::BTreeMap;

use crate::field::FieldDefinition;
use crate::profile::ValidationProfile;

/// Resolved schema for one dataset under one validation profile.
///
/// Immutable once built. A new schema version supersedes an existing one
/// instead of mutating it.
#[derive(Debug, Clone)]
pub struct DatasetSchema {
    pub dataset_id: String,
    pub profile: ValidationProfile,
    fields: Vec<FieldDefinition>,
    index: BTreeMap<String, usize>,
    unique_key_fields: Vec<String>,
}

impl DatasetSchema {
    /// Build a schema from ordered field definitions and a composite key.
    ///
    /// Later definitions with a repeated name replace earlier ones in the
    /// lookup index; registry loaders reject such tables before this point.
    pub fn new(
        dataset_id: impl Into<String>,
        profile: ValidationProfile,
        fields: Vec<FieldDefinition>,
        unique_key_fields: Vec<String>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.field_name.clone(), idx))
            .collect();
        Self {
            dataset_id: dataset_id.into(),
            profile,
            fields,
            index,
            unique_key_fields,
        }
    }

    /// Field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.index.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|field| field.required)
    }

    /// Ordered field names forming the composite natural key.
    pub fn unique_key_fields(&self) -> &[String] {
        &self.unique_key_fields
    }
}

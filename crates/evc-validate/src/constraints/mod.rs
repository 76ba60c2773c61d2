//! Duplicate constraint checker.
//!
//! A record's composite key is reduced to its non-empty components before
//! comparison: two records collide exactly when those reduced tuples are
//! equal. Within-batch groups are reported first, then collisions with
//! previously accepted batches, each in first-seen row order.

mod lookup;

use std::collections::HashMap;

use evc_model::{AllEmptyKeyPolicy, Condition, ConditionKind, DatasetSchema, KeyComponent};

use crate::error::{Result, ValidateError};
use crate::typed::{TypedBatch, canonical_text};

pub use lookup::{
    InMemoryLookup, LookupError, LookupMatches, NoPersistedBatches, PersistedLookup, match_stored,
};

/// Composite key of one record with empty components removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintKeyTuple {
    components: Vec<KeyComponent>,
}

impl ConstraintKeyTuple {
    /// Build a tuple from `(field, value)` pairs, dropping empty values.
    pub fn new<I, F, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<String>,
    {
        let components = pairs
            .into_iter()
            .map(|(field, value)| (field.into(), value.into()))
            .filter(|(_, value): &KeyComponent| !value.is_empty())
            .collect();
        Self { components }
    }

    /// Remaining `(field, value)` components in key-field order.
    pub fn components(&self) -> &[KeyComponent] {
        &self.components
    }

    /// True when every key component was empty.
    pub fn is_all_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Key tuple for every row of a typed batch.
///
/// A key field missing from the batch contributes an empty component.
pub fn key_tuples(key_fields: &[String], batch: &TypedBatch) -> Vec<ConstraintKeyTuple> {
    let columns: Vec<_> = key_fields
        .iter()
        .map(|field| (field.as_str(), batch.column(field)))
        .collect();

    (0..batch.row_count())
        .map(|row| {
            ConstraintKeyTuple::new(columns.iter().map(|(field, column)| {
                let value = column
                    .and_then(|column| column.cells.get(row))
                    .map(canonical_text)
                    .unwrap_or_default();
                (*field, value)
            }))
        })
        .collect()
}

/// Check a typed batch for duplicate keys, within itself and against
/// previously accepted batches.
///
/// The lookup is called at most once, with deduplicated candidates. Its
/// failure aborts the check. The schema is only read.
pub fn check_constraints(
    schema: &DatasetSchema,
    typed_batch: &TypedBatch,
    lookup: &dyn PersistedLookup,
    batch_id: Option<&str>,
    all_empty_keys: AllEmptyKeyPolicy,
) -> Result<Vec<Condition>> {
    let key_fields = schema.unique_key_fields();
    if key_fields.is_empty() || typed_batch.is_empty() {
        return Ok(Vec::new());
    }

    let span = tracing::info_span!(
        "check_constraints",
        dataset = %schema.dataset_id,
        key = %key_fields.join("|")
    );
    let _guard = span.enter();

    let header = key_fields.join(", ");
    let groups = group_rows(&key_tuples(key_fields, typed_batch), all_empty_keys);

    let mut conditions: Vec<Condition> = groups
        .iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(tuple, rows)| {
            Condition::column(
                &header,
                ConditionKind::DuplicateKeyInBatch {
                    key: tuple.components().to_vec(),
                    rows: rows.clone(),
                },
            )
        })
        .collect();

    let candidates: Vec<ConstraintKeyTuple> =
        groups.into_iter().map(|(tuple, _)| tuple).collect();
    if !candidates.is_empty() {
        let matches = lookup
            .find_matches(key_fields, &candidates, batch_id)
            .map_err(|source| {
                tracing::warn!(error = %source, "persisted lookup failed");
                ValidateError::ConstraintLookupFailed { source }
            })?;

        for candidate in &candidates {
            let batch_ids: Vec<String> = matches
                .iter()
                .filter(|(_, tuples)| tuples.contains(candidate))
                .map(|(batch_id, _)| batch_id.clone())
                .collect();
            if !batch_ids.is_empty() {
                conditions.push(Condition::column(
                    &header,
                    ConditionKind::DuplicateKeyAcrossBatches {
                        key: candidate.components().to_vec(),
                        batch_ids,
                    },
                ));
            }
        }
    }

    if !conditions.is_empty() {
        tracing::warn!(conditions = conditions.len(), "duplicate keys found");
    }
    Ok(conditions)
}

/// Group 1-indexed rows by key tuple, in first-seen order.
fn group_rows(
    tuples: &[ConstraintKeyTuple],
    all_empty_keys: AllEmptyKeyPolicy,
) -> Vec<(ConstraintKeyTuple, Vec<usize>)> {
    let mut groups: Vec<(ConstraintKeyTuple, Vec<usize>)> = Vec::new();
    let mut index: HashMap<&ConstraintKeyTuple, usize> = HashMap::new();

    for (idx, tuple) in tuples.iter().enumerate() {
        if tuple.is_all_empty() && all_empty_keys == AllEmptyKeyPolicy::Ignore {
            continue;
        }
        let slot = *index.entry(tuple).or_insert_with(|| {
            groups.push((tuple.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(idx + 1);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(pairs: &[(&str, &str)]) -> ConstraintKeyTuple {
        ConstraintKeyTuple::new(pairs.iter().copied())
    }

    #[test]
    fn test_empty_components_are_dropped() {
        let key = tuple(&[("a", "x"), ("b", ""), ("c", "z")]);
        assert_eq!(
            key.components(),
            &[
                ("a".to_string(), "x".to_string()),
                ("c".to_string(), "z".to_string())
            ]
        );
        assert!(tuple(&[("a", ""), ("b", "")]).is_all_empty());
    }

    #[test]
    fn test_null_tolerant_equality() {
        let partial = tuple(&[("a", "x"), ("b", ""), ("c", "z")]);
        let full = tuple(&[("a", "x"), ("b", "1"), ("c", "z")]);
        let partial_again = tuple(&[("a", "x"), ("b", ""), ("c", "z")]);
        assert_ne!(partial, full);
        assert_eq!(partial, partial_again);
    }

    #[test]
    fn test_group_rows_first_seen_order() {
        let tuples = vec![
            tuple(&[("a", "2")]),
            tuple(&[("a", "1")]),
            tuple(&[("a", "2")]),
            tuple(&[("a", "1")]),
        ];
        let groups = group_rows(&tuples, AllEmptyKeyPolicy::Group);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, vec![1, 3]);
        assert_eq!(groups[1].1, vec![2, 4]);
    }

    #[test]
    fn test_all_empty_policy() {
        let tuples = vec![tuple(&[("a", "")]), tuple(&[("a", "")])];
        let grouped = group_rows(&tuples, AllEmptyKeyPolicy::Group);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].1, vec![1, 2]);

        assert!(group_rows(&tuples, AllEmptyKeyPolicy::Ignore).is_empty());
    }
}

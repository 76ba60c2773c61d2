//! Persisted-lookup collaborator interface.

use std::collections::BTreeMap;

use super::ConstraintKeyTuple;

/// Error raised by a [`PersistedLookup`] implementation.
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Matches keyed by the id of the accepted batch that already holds them.
pub type LookupMatches = BTreeMap<String, Vec<ConstraintKeyTuple>>;

/// Access to key tuples of previously accepted batches.
///
/// Implementations compare with the same null-tolerant rule as the checker:
/// two tuples match when their non-empty components are identical.
pub trait PersistedLookup {
    /// Return, per accepted batch, the candidates it already contains.
    ///
    /// `excluding_batch_id` names the batch being validated so that a
    /// resubmission does not collide with its own earlier copy. Batches
    /// without a match are left out of the result.
    fn find_matches(
        &self,
        key_fields: &[String],
        candidates: &[ConstraintKeyTuple],
        excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError>;
}

impl<T: PersistedLookup + ?Sized> PersistedLookup for &T {
    fn find_matches(
        &self,
        key_fields: &[String],
        candidates: &[ConstraintKeyTuple],
        excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError> {
        (**self).find_matches(key_fields, candidates, excluding_batch_id)
    }
}

/// Lookup with no accepted batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistedBatches;

impl PersistedLookup for NoPersistedBatches {
    fn find_matches(
        &self,
        _key_fields: &[String],
        _candidates: &[ConstraintKeyTuple],
        _excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError> {
        Ok(LookupMatches::new())
    }
}

/// Accepted batches held in memory, keyed by batch id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookup {
    batches: BTreeMap<String, Vec<ConstraintKeyTuple>>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the key tuples of an accepted batch, replacing any earlier copy.
    pub fn insert(&mut self, batch_id: impl Into<String>, tuples: Vec<ConstraintKeyTuple>) {
        self.batches.insert(batch_id.into(), tuples);
    }

    #[must_use]
    pub fn with_batch(mut self, batch_id: impl Into<String>, tuples: Vec<ConstraintKeyTuple>) -> Self {
        self.insert(batch_id, tuples);
        self
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl PersistedLookup for InMemoryLookup {
    fn find_matches(
        &self,
        _key_fields: &[String],
        candidates: &[ConstraintKeyTuple],
        excluding_batch_id: Option<&str>,
    ) -> Result<LookupMatches, LookupError> {
        Ok(match_stored(
            self.batches
                .iter()
                .map(|(batch_id, tuples)| (batch_id.as_str(), tuples.as_slice())),
            candidates,
            excluding_batch_id,
        ))
    }
}

/// Match candidates against stored batches. Shared by lookup implementations.
pub fn match_stored<'a>(
    stored: impl IntoIterator<Item = (&'a str, &'a [ConstraintKeyTuple])>,
    candidates: &[ConstraintKeyTuple],
    excluding_batch_id: Option<&str>,
) -> LookupMatches {
    let mut matches = LookupMatches::new();
    for (batch_id, tuples) in stored {
        if Some(batch_id) == excluding_batch_id {
            continue;
        }
        let found: Vec<ConstraintKeyTuple> = candidates
            .iter()
            .filter(|candidate| tuples.contains(candidate))
            .cloned()
            .collect();
        if !found.is_empty() {
            matches.insert(batch_id.to_string(), found);
        }
    }
    matches
}

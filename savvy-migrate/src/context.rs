//! Identifier map scoped to a single migration run.
//!
//! Every run owns one [`MigrationContext`]; nothing is shared between runs,
//! so several migrations can execute in the same process.
use std::collections::{BTreeMap, HashMap};

/// Legacy document id to relational id, for one entity type.
///
/// Write-once per key: the first mapping recorded for a legacy id is kept.
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    entries: HashMap<String, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `legacy_id -> new_id`.
    ///
    /// # Returns
    ///
    /// `true` if the mapping was stored, `false` if `legacy_id` was already
    /// mapped (the existing mapping is left untouched).
    pub fn record(&mut self, legacy_id: String, new_id: String) -> bool {
        if self.entries.contains_key(&legacy_id) {
            return false;
        }
        self.entries.insert(legacy_id, new_id);
        true
    }

    pub fn resolve(&self, legacy_id: &str) -> Option<&str> {
        self.entries.get(legacy_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by legacy id.
    pub fn sorted(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|(legacy, new)| (legacy.as_str(), new.as_str()))
            .collect()
    }
}

/// Per-run state of the migration: one [`IdMap`] per referenced entity type.
#[derive(Debug, Default)]
pub struct MigrationContext {
    maps: HashMap<&'static str, IdMap>,
}

impl MigrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mapping for `entity`. See [`IdMap::record`].
    pub fn record(&mut self, entity: &'static str, legacy_id: String, new_id: String) -> bool {
        self.maps.entry(entity).or_default().record(legacy_id, new_id)
    }

    /// Looks up the relational id assigned to `legacy_id` of type `entity`.
    pub fn resolve(&self, entity: &str, legacy_id: &str) -> Option<&str> {
        self.maps.get(entity).and_then(|map| map.resolve(legacy_id))
    }

    /// Number of mappings recorded for `entity`.
    pub fn mapped(&self, entity: &str) -> usize {
        self.maps.get(entity).map_or(0, IdMap::len)
    }

    /// Total number of mappings across all entity types.
    pub fn len(&self) -> usize {
        self.maps.values().map(IdMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every mapping, grouped by entity type and sorted, for the audit map.
    pub fn entries(&self) -> BTreeMap<&'static str, BTreeMap<&str, &str>> {
        self.maps
            .iter()
            .map(|(entity, map)| (*entity, map.sorted()))
            .collect()
    }
}

//! The coverage universe: every declared endpoint keyed by canonical id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EndpointRecord;

/// Declared endpoints keyed by canonical identifier.
///
/// Built once by a declaration scanner, mutated in place by the correlator,
/// then partitioned into covered and uncovered endpoints for reporting.
/// Keys are kept sorted so partitions come out in lexicographic order.
///
/// # Examples
///
/// ```
/// use itsweep_core::{CoverageUniverse, EndpointRecord};
///
/// let mut universe = CoverageUniverse::new();
/// assert!(universe.insert(EndpointRecord::route("Get", "/b", 0)));
/// assert!(universe.insert(EndpointRecord::route("Get", "/a", 1)));
/// // Re-declaring an endpoint is a no-op.
/// assert!(!universe.insert(EndpointRecord::route("Get", "/a", 2)));
///
/// assert!(universe.mark_covered("GET /b"));
/// let uncovered: Vec<String> = universe
///     .uncovered()
///     .map(|record| record.canonical_id())
///     .collect();
/// assert_eq!(uncovered, vec!["GET /a"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageUniverse {
    endpoints: BTreeMap<String, EndpointRecord>,
}

impl CoverageUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declared endpoint.
    ///
    /// Returns `false` (and keeps the first declaration) when the canonical
    /// identifier is already present.
    pub fn insert(&mut self, record: EndpointRecord) -> bool {
        let id = record.canonical_id();
        if self.endpoints.contains_key(&id) {
            return false;
        }
        self.endpoints.insert(id, record);
        true
    }

    /// Returns the record for a canonical identifier.
    pub fn get(&self, id: &str) -> Option<&EndpointRecord> {
        self.endpoints.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.endpoints.contains_key(id)
    }

    /// Marks an endpoint covered.
    ///
    /// Returns `false` when the identifier is not declared. Marking an
    /// already-covered endpoint is allowed and returns `true`.
    pub fn mark_covered(&mut self, id: &str) -> bool {
        match self.endpoints.get_mut(id) {
            Some(record) => {
                record.covered = true;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Iterates all records in canonical-identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.endpoints.values()
    }

    /// Returns all records ordered by declaration position.
    pub fn in_declaration_order(&self) -> Vec<&EndpointRecord> {
        let mut records: Vec<&EndpointRecord> = self.endpoints.values().collect();
        records.sort_by_key(|record| record.ordinal);
        records
    }

    /// Iterates covered records in canonical-identifier order.
    pub fn covered(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.endpoints.values().filter(|record| record.covered)
    }

    /// Iterates uncovered records in canonical-identifier order.
    pub fn uncovered(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.endpoints.values().filter(|record| !record.covered)
    }

    /// Number of covered endpoints.
    pub fn covered_count(&self) -> usize {
        self.covered().count()
    }
}

impl Extend<EndpointRecord> for CoverageUniverse {
    fn extend<I: IntoIterator<Item = EndpointRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

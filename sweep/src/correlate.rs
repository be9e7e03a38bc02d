//! Correlation outcomes and the first-match-wins rule.

use itsweep_core::CoverageUniverse;
use serde::Serialize;
use tracing::warn;

/// What a mode's normalizer derived from one fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Normalized {
    /// Canonical identifiers to try, in priority order.
    pub candidates: Vec<String>,
    /// Endpoint text shown for the fixture when nothing matches.
    pub display: String,
    /// Type column text shown when nothing matches.
    pub kind: String,
    /// Replaces the extracted payload as the row's request parameters.
    pub request_param: Option<String>,
    /// Notes attached to the row whether or not it matches.
    pub notes: Vec<String>,
}

/// Result of correlating one fixture against the universe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Correlation {
    /// Identifier of the endpoint marked covered; `None` when unmatched.
    pub canonical_id: Option<String>,
    /// Identifier an unmatched row still merges on (an undeclared RPC
    /// method); ignored when `canonical_id` is set.
    pub group_key: Option<String>,
    pub endpoint: String,
    pub kind: String,
    pub request_param: Option<String>,
    pub notes: Vec<String>,
}

impl Correlation {
    pub fn is_matched(&self) -> bool {
        self.canonical_id.is_some()
    }

    /// Identifier the report groups this row on, if any.
    pub fn grouping_id(&self) -> Option<&str> {
        self.canonical_id.as_deref().or(self.group_key.as_deref())
    }

    /// An unmatched outcome carrying the normalizer's display values.
    pub fn unmatched(normalized: Normalized, note: &str) -> Self {
        let mut notes = normalized.notes;
        if !note.is_empty() {
            notes.push(note.to_string());
        }
        Self {
            canonical_id: None,
            group_key: None,
            endpoint: normalized.display,
            kind: normalized.kind,
            request_param: normalized.request_param,
            notes,
        }
    }
}

/// Marks the first candidate present in `universe` as covered and returns
/// its identifier.
///
/// Nothing is marked when no candidate is declared.
///
/// # Examples
///
/// ```
/// use itsweep::correlate::mark_first_declared;
/// use itsweep_core::{CoverageUniverse, EndpointRecord};
///
/// let mut universe = CoverageUniverse::new();
/// universe.insert(EndpointRecord::route("Get", "/item/5", 0));
///
/// let candidates = vec!["GET /item/{id}".to_string(), "GET /item/5".to_string()];
/// assert_eq!(mark_first_declared(&candidates, &mut universe).as_deref(), Some("GET /item/5"));
/// assert_eq!(universe.covered_count(), 1);
/// ```
pub fn mark_first_declared(candidates: &[String], universe: &mut CoverageUniverse) -> Option<String> {
    candidates
        .iter()
        .find(|id| universe.mark_covered(id))
        .cloned()
}

/// Note attached to a row whose query names more than one declared field.
///
/// Logs the ambiguity and returns `None` when there is nothing to report.
pub fn ambiguity_note(fixture: &str, chosen: &str, candidates: &[String]) -> Option<String> {
    let others: Vec<&str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|candidate| *candidate != chosen)
        .collect();
    if others.is_empty() {
        return None;
    }
    warn!(
        fixture,
        chosen,
        others = ?others,
        "query names several declared fields, keeping the first declared"
    );
    Some(format!("Also matches: {}", others.join(", ")))
}

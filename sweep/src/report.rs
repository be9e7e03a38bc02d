//! Coverage report assembly.
//!
//! Rows come in two phases: one row per fixture in walk order, then one row
//! per declared endpoint that no fixture exercised, sorted by canonical
//! identifier. Adjacent fixture rows that share a non-empty identifier form
//! a merge group.

use chrono::{SecondsFormat, Utc};
use itsweep_core::{Column, CoverageUniverse, ReportRow, RowGroup, Status, Transport};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReportConfig;

/// Totals for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Fixture files processed.
    pub fixtures: usize,
    /// Fixtures correlated to a declared endpoint.
    pub matched: usize,
    /// Fixtures correlated to nothing (chained scenarios in GraphQL mode).
    pub unmatched: usize,
    /// Declared endpoints.
    pub declared: usize,
    /// Declared endpoints exercised by at least one fixture.
    pub covered: usize,
    /// `covered / declared`, or 0 when nothing is declared.
    pub coverage: f64,
}

/// A finished coverage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub transport: Transport,
    /// RFC 3339 timestamp of report assembly.
    pub generated_at: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
    /// Merge groups over `rows`, in row order.
    pub groups: Vec<RowGroup>,
    pub summary: ReportSummary,
}

impl CoverageReport {
    /// Rows produced by fixtures (phase 1).
    pub fn fixture_rows(&self) -> &[ReportRow] {
        &self.rows[..self.summary.fixtures.min(self.rows.len())]
    }

    /// Rows produced by uncovered endpoints (phase 2).
    pub fn uncovered_rows(&self) -> &[ReportRow] {
        &self.rows[self.summary.fixtures.min(self.rows.len())..]
    }

    /// Returns the group containing row `index`, if any.
    pub fn group_of(&self, index: usize) -> Option<&RowGroup> {
        self.groups.iter().find(|group| group.contains(index))
    }
}

/// Accumulates fixture rows, then appends uncovered endpoints.
///
/// # Examples
///
/// ```
/// use itsweep::config::ReportConfig;
/// use itsweep::report::ReportBuilder;
/// use itsweep_core::{CoverageUniverse, EndpointRecord, ReportRow, Status, Transport};
///
/// let mut universe = CoverageUniverse::new();
/// universe.insert(EndpointRecord::route("Get", "/a", 0));
/// universe.insert(EndpointRecord::route("Get", "/intools/b", 1));
/// universe.mark_covered("GET /a");
///
/// let mut builder = ReportBuilder::new(Transport::Rest);
/// builder.push_fixture(ReportRow {
///     canonical_id: "GET /a".into(),
///     matched: true,
///     endpoint: "/a".into(),
///     ..Default::default()
/// });
/// let report = builder.finish(&universe, &ReportConfig::default());
///
/// assert_eq!(report.rows.len(), 2);
/// assert_eq!(report.rows[1].status, Status::WontDo);
/// assert_eq!(report.summary.coverage, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    transport: Transport,
    rows: Vec<ReportRow>,
}

impl ReportBuilder {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            rows: Vec::new(),
        }
    }

    /// Appends one fixture row. Call in walk order.
    pub fn push_fixture(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn fixture_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends uncovered-endpoint rows and computes groups and totals.
    pub fn finish(self, universe: &CoverageUniverse, config: &ReportConfig) -> CoverageReport {
        let fixtures = self.rows.len();
        let matched = self.rows.iter().filter(|row| row.matched).count();
        let groups = merge_groups(&self.rows);

        let mut rows = self.rows;
        rows.extend(universe.uncovered().map(|record| {
            let id = record.canonical_id();
            let mut row =
                ReportRow::uncovered(&id, &record.name, record.kind.type_label(), Status::NoTestCase);
            if let Some(rule) = config.exclusion_for(&id) {
                row.status = rule.status;
                row.notes = rule.notes.clone();
            }
            row
        }));

        let declared = universe.len();
        let covered = universe.covered_count();
        let summary = ReportSummary {
            fixtures,
            matched,
            unmatched: fixtures - matched,
            declared,
            covered,
            coverage: if declared == 0 {
                0.0
            } else {
                covered as f64 / declared as f64
            },
        };
        info!(
            transport = %self.transport,
            fixtures,
            matched,
            declared,
            covered,
            "report assembled"
        );

        CoverageReport {
            transport: self.transport,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            columns: self.transport.columns().to_vec(),
            rows,
            groups,
            summary,
        }
    }
}

/// Finds maximal runs (two rows or more) of adjacent rows sharing a
/// non-empty canonical identifier.
///
/// Rows are never reordered; a group closes as soon as the identifier
/// changes. Rows without an identifier (unrecognized targets, chained
/// GraphQL cases) never group.
///
/// # Examples
///
/// ```
/// use itsweep::report::merge_groups;
/// use itsweep_core::{ReportRow, RowGroup};
///
/// let row = |id: &str| ReportRow {
///     canonical_id: id.into(),
///     matched: true,
///     ..Default::default()
/// };
/// let rows = vec![row("A"), row("A"), row("B"), row("A"), row("A"), row("A")];
/// assert_eq!(
///     merge_groups(&rows),
///     vec![RowGroup { start: 0, end: 1 }, RowGroup { start: 3, end: 5 }]
/// );
/// ```
pub fn merge_groups(rows: &[ReportRow]) -> Vec<RowGroup> {
    let mut groups = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let mut end = start;
        if !rows[start].canonical_id.is_empty() {
            while end + 1 < rows.len()
                && rows[end + 1].canonical_id == rows[start].canonical_id
            {
                end += 1;
            }
        }
        if end > start {
            groups.push(RowGroup { start, end });
        }
        start = end + 1;
    }
    groups
}

#[cfg(test)]
mod tests {
    use itsweep_core::{EndpointKind, EndpointRecord};

    use super::*;

    fn matched(id: &str) -> ReportRow {
        ReportRow {
            canonical_id: id.to_string(),
            matched: true,
            ..Default::default()
        }
    }

    fn unmatched() -> ReportRow {
        ReportRow {
            endpoint: "Not found in queries/mutation file".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_without_identifier_never_group() {
        let rows = vec![unmatched(), unmatched(), matched("A"), unmatched(), matched("A")];
        assert!(merge_groups(&rows).is_empty());
    }

    #[test]
    fn test_undeclared_rpc_rows_group_on_method_name() {
        let removed = ReportRow {
            canonical_id: "Removed".to_string(),
            endpoint: "Removed".to_string(),
            notes: "Not found in proto file".to_string(),
            ..Default::default()
        };
        let rows = vec![matched("Ping"), removed.clone(), removed, unmatched()];
        assert_eq!(merge_groups(&rows), vec![RowGroup { start: 1, end: 2 }]);
    }

    #[test]
    fn test_group_boundary_follows_identifier_change() {
        let rows = vec![matched("A"), matched("B"), matched("B"), matched("C")];
        assert_eq!(merge_groups(&rows), vec![RowGroup { start: 1, end: 2 }]);
    }

    #[test]
    fn test_empty_rows_have_no_groups() {
        assert!(merge_groups(&[]).is_empty());
    }

    #[test]
    fn test_uncovered_rows_sorted_and_never_covered() {
        let mut universe = CoverageUniverse::new();
        universe.extend([
            EndpointRecord::new("Zeta", EndpointKind::Mutation, 0),
            EndpointRecord::new("Alpha", EndpointKind::Query, 1),
            EndpointRecord::new("Beta", EndpointKind::Query, 2),
        ]);
        universe.mark_covered("Beta");

        let mut builder = ReportBuilder::new(Transport::GraphQl);
        builder.push_fixture(matched("Beta"));
        builder.push_fixture(unmatched());
        let report = builder.finish(&universe, &ReportConfig::default());

        let uncovered: Vec<(&str, &str)> = report
            .uncovered_rows()
            .iter()
            .map(|row| (row.endpoint.as_str(), row.kind.as_str()))
            .collect();
        assert_eq!(uncovered, vec![("Alpha", "Queries"), ("Zeta", "Mutation")]);
        assert!(report.uncovered_rows().iter().all(|row| row.status == Status::NoTestCase));
        assert_eq!(report.fixture_rows().len(), 2);
        assert_eq!(report.summary.unmatched, 1);
        assert_eq!(report.summary.covered, 1);
        assert_eq!(report.columns, Transport::GraphQl.columns());
    }

    #[test]
    fn test_exclusion_rule_overrides_status() {
        let mut universe = CoverageUniverse::new();
        universe.insert(EndpointRecord::route("Get", "/intools/sync", 0));
        let report = ReportBuilder::new(Transport::Rest).finish(&universe, &ReportConfig::default());

        let row = &report.rows[0];
        assert_eq!(row.status, Status::WontDo);
        assert_eq!(row.notes, "Intools");
        assert_eq!(row.kind, "GET");
    }

    #[test]
    fn test_empty_universe_has_zero_coverage() {
        let report = ReportBuilder::new(Transport::Rpc)
            .finish(&CoverageUniverse::new(), &ReportConfig::default());
        assert_eq!(report.summary.coverage, 0.0);
        assert!(report.rows.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
    }
}

//! The sweep pipeline: scan, walk, correlate, report.

use std::path::Path;

use itsweep_core::{FixtureRecord, ReportRow, Status, Transport};
use tracing::{debug, info};

use crate::config::SweepConfig;
use crate::correlate::Correlation;
use crate::error::Result;
use crate::loader::{fixture_paths, load_fixture};
use crate::mode::SweepMode;
use crate::report::{CoverageReport, ReportBuilder};

/// Runs one sweep of `fixtures_root` against the endpoints `mode` declares.
///
/// Fixtures are processed one at a time in lexical walk order; each file is
/// read once and dropped before the next is opened.
///
/// # Errors
///
/// Returns [`SweepError::InvalidInput`](crate::SweepError::InvalidInput)
/// when `fixtures_root` is not a directory. Unreadable or malformed
/// fixtures are not errors.
pub fn run_sweep(
    mode: &dyn SweepMode,
    fixtures_root: impl AsRef<Path>,
    config: &SweepConfig,
) -> Result<CoverageReport> {
    let transport = mode.transport();
    let mut universe = mode.scan();
    info!(%transport, endpoints = universe.len(), "scanned declarations");

    let paths = fixture_paths(fixtures_root)?;
    let mut builder = ReportBuilder::new(transport);
    for path in &paths {
        let fixture = load_fixture(path);
        let payloads = mode.extract(&fixture.raw);
        let normalized = mode.normalize(&fixture.record, &universe);
        let outcome = mode.correlate(normalized, &mut universe);
        debug!(
            path = %path.display(),
            endpoint = %outcome.endpoint,
            matched = outcome.is_matched(),
            "correlated fixture"
        );
        builder.push_fixture(fixture_row(
            &fixture.record,
            outcome,
            payloads.staging.as_str(),
            transport,
        ));
    }
    info!(fixtures = builder.fixture_count(), "processed fixtures");

    Ok(builder.finish(&universe, &config.report))
}

/// Builds the report row for one correlated fixture.
///
/// The request parameters are the normalizer's override when it produced
/// one, the extracted staging payload otherwise.
pub fn fixture_row(
    fixture: &FixtureRecord,
    outcome: Correlation,
    extracted: &str,
    transport: Transport,
) -> ReportRow {
    let matched = outcome.is_matched();
    ReportRow {
        canonical_id: outcome.grouping_id().unwrap_or_default().to_string(),
        matched,
        endpoint: outcome.endpoint,
        kind: outcome.kind,
        test_case_name: fixture.query_name.clone(),
        file_name: fixture.file_name(),
        scenario: String::new(),
        expected_response: fixture.staging().map(|staging| staging.response_code),
        request_param: outcome
            .request_param
            .unwrap_or_else(|| extracted.to_string()),
        query: match transport {
            Transport::GraphQl => fixture.query.clone(),
            Transport::Rest | Transport::Rpc => String::new(),
        },
        status: Status::Live,
        notes: outcome.notes.join("; "),
        pic: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_row_prefers_route_payload() {
        let fixture = FixtureRecord::from_json(
            "dir/case.json",
            r#"{"queryName": "case", "structure": [{"responseCode": 201}]}"#,
        )
        .unwrap();
        let outcome = Correlation {
            canonical_id: Some("GET /item/5".into()),
            group_key: None,
            endpoint: "/item/5".into(),
            kind: "GET".into(),
            request_param: Some(r#"{"id": 5}"#.into()),
            notes: Vec::new(),
        };

        let row = fixture_row(&fixture, outcome, r#"{"body": true}"#, Transport::Rest);
        assert!(row.matched);
        assert_eq!(row.request_param, r#"{"id": 5}"#);
        assert_eq!(row.file_name, "case.json");
        assert_eq!(row.expected_response, Some(201));
        assert_eq!(row.status, Status::Live);
        assert!(row.query.is_empty());
    }

    #[test]
    fn test_fixture_row_without_structure_has_no_expected_response() {
        let fixture = FixtureRecord::empty("broken.json");
        let outcome = Correlation {
            notes: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        let row = fixture_row(&fixture, outcome, "{}", Transport::GraphQl);
        assert!(!row.matched);
        assert!(row.canonical_id.is_empty());
        assert_eq!(row.expected_response, None);
        assert_eq!(row.request_param, "{}");
        assert_eq!(row.notes, "a; b");
    }
}

//! Report rows as consumed by report writers.

use serde::{Deserialize, Serialize};

use crate::types::{Column, Status};

/// One row of a coverage report.
///
/// Fixture rows carry everything the fixture contributed; uncovered-endpoint
/// rows carry only the endpoint, its type, and a status.
///
/// # Examples
///
/// ```
/// use itsweep_core::{Column, ReportRow, Status};
///
/// let row = ReportRow::uncovered("GET /ping", "/ping", "GET", Status::NoTestCase);
/// assert_eq!(row.cell(Column::Endpoint), "/ping");
/// assert_eq!(row.cell(Column::Type), "GET");
/// assert_eq!(row.cell(Column::Status), "No TestCase");
/// assert_eq!(row.cell(Column::ExpectedResponse), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Identifier the row is grouped on: the matched endpoint's canonical
    /// identifier, or the method name of an undeclared RPC call. Empty when
    /// the fixture names nothing recognizable.
    pub canonical_id: String,
    /// Whether the row's fixture was correlated to a declared endpoint.
    /// Always `false` for uncovered-endpoint rows.
    pub matched: bool,
    pub endpoint: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub test_case_name: String,
    pub file_name: String,
    pub scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_response: Option<i64>,
    pub request_param: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub query: String,
    pub status: Status,
    pub notes: String,
    pub pic: String,
}

impl ReportRow {
    /// Builds a row for a declared endpoint with no fixture.
    pub fn uncovered(canonical_id: &str, endpoint: &str, kind: &str, status: Status) -> Self {
        Self {
            canonical_id: canonical_id.to_string(),
            endpoint: endpoint.to_string(),
            kind: kind.to_string(),
            status,
            ..Default::default()
        }
    }

    /// Returns the text of one column.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Endpoint => self.endpoint.clone(),
            Column::Type => self.kind.clone(),
            Column::TestCaseName => self.test_case_name.clone(),
            Column::FileName => self.file_name.clone(),
            Column::Scenario => self.scenario.clone(),
            Column::ExpectedResponse => self
                .expected_response
                .map(|code| code.to_string())
                .unwrap_or_default(),
            Column::RequestParam => self.request_param.clone(),
            Column::Query => self.query.clone(),
            Column::Status => self.status.label().to_string(),
            Column::Notes => self.notes.clone(),
            Column::Pic => self.pic.clone(),
        }
    }

    /// Returns the cells for `columns`, in order.
    pub fn cells(&self, columns: &[Column]) -> Vec<String> {
        columns.iter().map(|column| self.cell(*column)).collect()
    }
}

/// Inclusive range of data-row indices merged on the grouped columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGroup {
    pub start: usize,
    pub end: usize,
}

impl RowGroup {
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

//! Endpoint and report vocabulary shared by every sweep mode.
//!
//! This module defines the declared-endpoint model, the closed status
//! vocabulary used in the report's status column, and the per-transport
//! column schema. The types serialize with [`serde`] so reports can be
//! written as JSON or YAML without an intermediate representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transport style of the API surface being swept.
///
/// Selects the declaration dialect, the fixture target field, and the
/// report column schema.
///
/// # Examples
///
/// ```
/// use itsweep_core::Transport;
///
/// assert_eq!(Transport::Rest.label(), "rest");
/// assert_eq!(Transport::GraphQl.to_string(), "graphql");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// HTTP routes registered through handler calls.
    Rest,
    /// GraphQL query and mutation fields.
    #[serde(rename = "graphql")]
    GraphQl,
    /// RPC methods declared in a schema file.
    Rpc,
}

impl Transport {
    /// Returns the lowercase label used in logs and serialized reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::GraphQl => "graphql",
            Self::Rpc => "rpc",
        }
    }

    /// Returns the report columns for this transport, in display order.
    ///
    /// # Examples
    ///
    /// ```
    /// use itsweep_core::{Column, Transport};
    ///
    /// let columns = Transport::Rpc.columns();
    /// assert_eq!(columns.first(), Some(&Column::Endpoint));
    /// assert!(!columns.contains(&Column::Type));
    /// assert!(Transport::GraphQl.columns().contains(&Column::Query));
    /// ```
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Rest => &[
                Column::Endpoint,
                Column::Type,
                Column::TestCaseName,
                Column::FileName,
                Column::Scenario,
                Column::ExpectedResponse,
                Column::RequestParam,
                Column::Status,
                Column::Notes,
                Column::Pic,
            ],
            Self::GraphQl => &[
                Column::Endpoint,
                Column::Type,
                Column::TestCaseName,
                Column::FileName,
                Column::Scenario,
                Column::ExpectedResponse,
                Column::RequestParam,
                Column::Query,
                Column::Status,
                Column::Notes,
                Column::Pic,
            ],
            Self::Rpc => &[
                Column::Endpoint,
                Column::TestCaseName,
                Column::FileName,
                Column::Scenario,
                Column::ExpectedResponse,
                Column::RequestParam,
                Column::Status,
                Column::Notes,
                Column::Pic,
            ],
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of a declared endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EndpointKind {
    /// HTTP route; `method` is the uppercased verb (e.g. `GET`).
    Route { method: String },
    /// GraphQL field declared in the queries file.
    Query,
    /// GraphQL field declared in the mutations file.
    Mutation,
    /// RPC method.
    Rpc,
}

impl EndpointKind {
    /// Returns the value shown in the report's `Type` column.
    ///
    /// # Examples
    ///
    /// ```
    /// use itsweep_core::EndpointKind;
    ///
    /// let route = EndpointKind::Route { method: "POST".into() };
    /// assert_eq!(route.type_label(), "POST");
    /// assert_eq!(EndpointKind::Query.type_label(), "Queries");
    /// assert_eq!(EndpointKind::Mutation.type_label(), "Mutation");
    /// ```
    pub fn type_label(&self) -> &str {
        match self {
            Self::Route { method } => method,
            Self::Query => "Queries",
            Self::Mutation => "Mutation",
            Self::Rpc => "",
        }
    }
}

/// One declared endpoint and its coverage flag.
///
/// Created in bulk by a declaration scanner, marked covered by the
/// correlator, and read by the report builder.
///
/// # Examples
///
/// ```
/// use itsweep_core::{EndpointKind, EndpointRecord};
///
/// let record = EndpointRecord::route("get", "/remind/add", 0);
/// assert_eq!(record.canonical_id(), "GET /remind/add");
/// assert_eq!(record.kind, EndpointKind::Route { method: "GET".into() });
/// assert!(!record.covered);
///
/// let field = EndpointRecord::new("GetProductDetail", EndpointKind::Query, 3);
/// assert_eq!(field.canonical_id(), "GetProductDetail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Route path, field name or method name.
    pub name: String,
    /// Declaration kind.
    #[serde(flatten)]
    pub kind: EndpointKind,
    /// Position of the first declaration in the scanned source(s).
    pub ordinal: usize,
    /// Whether at least one fixture was correlated to this endpoint.
    pub covered: bool,
}

impl EndpointRecord {
    /// Creates an uncovered record.
    pub fn new(name: &str, kind: EndpointKind, ordinal: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ordinal,
            covered: false,
        }
    }

    /// Creates an uncovered HTTP route record; the verb is uppercased.
    pub fn route(verb: &str, path: &str, ordinal: usize) -> Self {
        Self::new(
            path,
            EndpointKind::Route {
                method: verb.to_ascii_uppercase(),
            },
            ordinal,
        )
    }

    /// Returns the canonical identifier used as the coverage key.
    ///
    /// Routes are keyed `"<VERB> <path>"`; every other kind by name.
    pub fn canonical_id(&self) -> String {
        match &self.kind {
            EndpointKind::Route { method } => route_id(method, &self.name),
            _ => self.name.clone(),
        }
    }
}

/// Builds the canonical identifier of an HTTP route.
///
/// # Examples
///
/// ```
/// assert_eq!(itsweep_core::route_id("patch", "/item"), "PATCH /item");
/// ```
pub fn route_id(method: &str, path: &str) -> String {
    format!("{} {path}", method.to_ascii_uppercase())
}

/// Value of the report's status column.
///
/// The set is closed: spreadsheet consumers restrict the column to exactly
/// these labels.
///
/// # Examples
///
/// ```
/// use itsweep_core::Status;
///
/// assert_eq!(Status::NoTestCase.label(), "No TestCase");
/// assert_eq!("Wont Do".parse::<Status>().unwrap(), Status::WontDo);
/// assert!("Done".parse::<Status>().is_err());
/// assert_eq!(Status::ALL.len(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    /// Test known to work at capture time (default for fixture rows).
    #[default]
    #[serde(rename = "Live")]
    Live,
    #[serde(rename = "On Progress")]
    OnProgress,
    #[serde(rename = "Not Yet")]
    NotYet,
    #[serde(rename = "Pending")]
    Pending,
    /// No fixture exercises the endpoint (default for uncovered rows).
    #[serde(rename = "No TestCase")]
    NoTestCase,
    #[serde(rename = "Not Checked")]
    NotChecked,
    #[serde(rename = "Need Fix")]
    NeedFix,
    #[serde(rename = "Wont Do")]
    WontDo,
    #[serde(rename = "Endpoint Need Adjustment")]
    EndpointNeedAdjustment,
}

impl Status {
    /// Every allowed status, in drop-down order.
    pub const ALL: [Status; 9] = [
        Status::Live,
        Status::OnProgress,
        Status::NotYet,
        Status::Pending,
        Status::NoTestCase,
        Status::NotChecked,
        Status::NeedFix,
        Status::WontDo,
        Status::EndpointNeedAdjustment,
    ];

    /// Returns the display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::OnProgress => "On Progress",
            Self::NotYet => "Not Yet",
            Self::Pending => "Pending",
            Self::NoTestCase => "No TestCase",
            Self::NotChecked => "Not Checked",
            Self::NeedFix => "Need Fix",
            Self::WontDo => "Wont Do",
            Self::EndpointNeedAdjustment => "Endpoint Need Adjustment",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a label is outside the status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Endpoint,
    Type,
    TestCaseName,
    FileName,
    Scenario,
    ExpectedResponse,
    RequestParam,
    Query,
    Status,
    Notes,
    Pic,
}

impl Column {
    /// Returns the header text.
    pub fn header(self) -> &'static str {
        match self {
            Self::Endpoint => "Endpoint",
            Self::Type => "Type",
            Self::TestCaseName => "Test Case Name",
            Self::FileName => "File Name",
            Self::Scenario => "Scenario",
            Self::ExpectedResponse => "Expected Response",
            Self::RequestParam => "Request Param",
            Self::Query => "Query",
            Self::Status => "Status",
            Self::Notes => "Notes",
            Self::Pic => "PIC",
        }
    }

    /// Returns `true` for columns merged across a group of rows.
    pub fn is_grouped(self) -> bool {
        matches!(self, Self::Endpoint | Self::Type)
    }
}

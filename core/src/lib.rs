//! Core types for integration-test coverage sweeps.
//!
//! This crate defines the data model shared by the sweep engine and its
//! front-ends:
//!
//! - [`EndpointRecord`]: one declared endpoint (route, GraphQL field, RPC
//!   method) and its coverage flag.
//! - [`CoverageUniverse`]: every declared endpoint keyed by canonical
//!   identifier.
//! - [`FixtureRecord`]: one recorded integration-test fixture, parsed
//!   leniently.
//! - [`ExtractedPayload`]: a request payload cut out of raw fixture text, or
//!   one of the `{}` / `null` sentinels.
//! - [`ReportRow`]: one row of the coverage report, with [`Status`] drawn
//!   from a closed vocabulary.
//!
//! # Example
//!
//! ```
//! use itsweep_core::*;
//!
//! let mut universe = CoverageUniverse::new();
//! universe.insert(EndpointRecord::route("Get", "/remind/list", 0));
//! universe.insert(EndpointRecord::route("Post", "/remind/add", 1));
//!
//! assert!(universe.mark_covered(&route_id("post", "/remind/add")));
//! assert_eq!(universe.covered_count(), 1);
//!
//! let missing: Vec<ReportRow> = universe
//!     .uncovered()
//!     .map(|record| {
//!         ReportRow::uncovered(
//!             &record.canonical_id(),
//!             &record.name,
//!             record.kind.type_label(),
//!             Status::NoTestCase,
//!         )
//!     })
//!     .collect();
//! assert_eq!(missing.len(), 1);
//! assert_eq!(missing[0].endpoint, "/remind/list");
//! ```

mod fixture;
mod payload;
mod row;
mod types;
mod universe;

pub use fixture::{FixtureRecord, PRODUCTION_INDEX, STAGING_INDEX, Structure};
pub use payload::{ABSENT_SENTINEL, EnvPayloads, ExtractedPayload, NULL_SENTINEL};
pub use row::{ReportRow, RowGroup};
pub use types::*;
pub use universe::CoverageUniverse;

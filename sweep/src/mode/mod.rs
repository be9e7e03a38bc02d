//! Transport-specific sweep modes.
//!
//! A mode knows how one transport declares endpoints and how its fixtures
//! reference them. The pipeline in [`crate::run_sweep`] is written once
//! against [`SweepMode`]; the concrete mode is chosen at start-up.

pub mod graphql;
pub mod rest;
pub mod rpc;

use std::path::Path;

use itsweep_core::{CoverageUniverse, EnvPayloads, FixtureRecord, Transport};
use tracing::warn;

use crate::correlate::{Correlation, Normalized};

pub use graphql::GraphQlMode;
pub use rest::RestMode;
pub use rpc::RpcMode;

/// Capabilities one transport contributes to a sweep.
pub trait SweepMode {
    /// Transport this mode sweeps.
    fn transport(&self) -> Transport;

    /// Builds the universe of declared endpoints from the mode's sources.
    fn scan(&self) -> CoverageUniverse;

    /// Extracts the staging and production request payloads from raw
    /// fixture text.
    fn extract(&self, raw: &str) -> EnvPayloads;

    /// Derives the candidate identifiers and display values for a fixture.
    fn normalize(&self, fixture: &FixtureRecord, universe: &CoverageUniverse) -> Normalized;

    /// Marks the endpoint a fixture exercises as covered.
    ///
    /// At most one endpoint is marked per call.
    fn correlate(&self, normalized: Normalized, universe: &mut CoverageUniverse) -> Correlation;
}

/// Reads a declaration source, treating an unreadable file as empty text.
pub fn read_source(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read declaration source, scanning as empty");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_source_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_source(dir.path().join("absent.go")), "");
    }

    #[test]
    fn test_modes_are_object_safe() {
        let modes: Vec<Box<dyn SweepMode>> = vec![
            Box::new(RpcMode::new("rpc Ping(Req) returns (Res);", &Default::default()).unwrap()),
            Box::new(GraphQlMode::new("", "", &Default::default())),
        ];
        let transports: Vec<Transport> = modes.iter().map(|mode| mode.transport()).collect();
        assert_eq!(transports, vec![Transport::Rpc, Transport::GraphQl]);
    }
}

//! Fixture corpus walking and loading.
//!
//! Every regular file whose path ends in the literal text `json` is one
//! fixture. The suffix rule is textual: `case.json` and `casejson` both
//! qualify.

use std::path::{Path, PathBuf};

use itsweep_core::FixtureRecord;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, SweepError};

/// Suffix that marks a file as a fixture.
pub const FIXTURE_SUFFIX: &str = "json";

/// A parsed fixture together with the raw text it was parsed from.
///
/// The raw text feeds the brace-balanced extractor; the record feeds
/// everything else.
#[derive(Debug, Clone, Default)]
pub struct LoadedFixture {
    pub record: FixtureRecord,
    pub raw: String,
}

impl LoadedFixture {
    pub fn path(&self) -> &Path {
        &self.record.path
    }
}

/// Returns `true` when `path` names a fixture under the literal suffix rule.
///
/// # Examples
///
/// ```
/// use itsweep::loader::is_fixture_path;
///
/// assert!(is_fixture_path("cases/add.json"));
/// assert!(is_fixture_path("cases/addjson"));
/// assert!(!is_fixture_path("cases/add.json5"));
/// ```
pub fn is_fixture_path(path: impl AsRef<Path>) -> bool {
    path.as_ref().to_string_lossy().ends_with(FIXTURE_SUFFIX)
}

/// Lists the fixture files under `root` in lexical walk order.
///
/// Entries that cannot be visited are logged and skipped.
///
/// # Errors
///
/// Returns [`SweepError::InvalidInput`] when `root` is not a directory.
pub fn fixture_paths(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(SweepError::InvalidInput(format!(
            "fixture directory not found: {}",
            root.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_fixture_path(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Loads one fixture.
///
/// Never fails: an unreadable file or invalid JSON is logged and yields a
/// zero-valued record so the fixture still gets its report row.
pub fn load_fixture(path: impl AsRef<Path>) -> LoadedFixture {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read fixture");
            return LoadedFixture {
                record: FixtureRecord::empty(path),
                raw: String::new(),
            };
        }
    };

    let record = match FixtureRecord::from_json(path, &raw) {
        Ok(record) => record,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid fixture JSON, using defaults");
            FixtureRecord::empty(path)
        }
    };
    debug!(path = %path.display(), name = %record.query_name, "loaded fixture");

    LoadedFixture { record, raw }
}

/// Loads every fixture under `root` in walk order.
pub fn load_fixtures(root: impl AsRef<Path>) -> Result<Vec<LoadedFixture>> {
    Ok(fixture_paths(root)?.iter().map(load_fixture).collect())
}

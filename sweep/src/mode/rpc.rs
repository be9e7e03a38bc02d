//! RPC mode: methods declared in a schema file and invoked through the
//! function gateway.

use std::path::Path;
use std::sync::LazyLock;

use itsweep_core::{CoverageUniverse, EndpointKind, EndpointRecord, EnvPayloads, FixtureRecord, Transport};
use regex::Regex;

use super::{SweepMode, read_source};
use crate::config::RpcConfig;
use crate::correlate::{Correlation, Normalized, mark_first_declared};
use crate::error::{Result, SweepError};
use crate::extract::extract_value;
use crate::normalize::title_case;

/// Note for a fixture whose target is not a function-gateway path.
pub const UNRECOGNIZED_NOTE: &str = "Unrecognized function path";

/// Note for a method the schema does not declare.
pub const NOT_FOUND_NOTE: &str = "Not found in proto file";

static RPC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brpc\s+([A-Za-z0-9_]+)").expect("static regex must compile"));

/// Sweeps methods declared as `rpc Method(Request) returns (Response)`.
#[derive(Debug, Clone)]
pub struct RpcMode {
    proto: String,
    variables_key: String,
    function_path: Regex,
}

impl RpcMode {
    /// Creates a mode over the given schema text.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Config`] if the function-path pattern built from
    /// the repository name does not compile.
    pub fn new(proto: impl Into<String>, config: &RpcConfig) -> Result<Self> {
        Ok(Self {
            proto: proto.into(),
            variables_key: config.variables_key.clone(),
            function_path: function_path_pattern(&config.repository)?,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, config: &RpcConfig) -> Result<Self> {
        Self::new(read_source(path), config)
    }

    /// Pulls the method name out of a
    /// `{host}/function/<repo>.<Repo>.<Method>/invoke` target.
    ///
    /// Returns an empty string when the target does not have that shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use itsweep::config::RpcConfig;
    /// use itsweep::mode::RpcMode;
    ///
    /// let config = RpcConfig { repository: "sampleapp".into(), ..Default::default() };
    /// let mode = RpcMode::new("", &config).unwrap();
    /// assert_eq!(
    ///     mode.method_name("{host}/function/sampleapp.Sampleapp.GetProductDetail/invoke"),
    ///     "GetProductDetail"
    /// );
    /// assert_eq!(mode.method_name("{host}/function/other.Other.Ping/invoke"), "");
    /// ```
    pub fn method_name<'a>(&self, target: &'a str) -> &'a str {
        self.function_path
            .captures(target)
            .and_then(|caps| caps.get(1))
            .map_or("", |name| name.as_str())
    }
}

fn function_path_pattern(repository: &str) -> Result<Regex> {
    let pattern = format!(
        r"\{{host\}}/function/{}\.{}\.([A-Za-z0-9]+)/invoke",
        regex::escape(repository),
        regex::escape(&title_case(repository))
    );
    Regex::new(&pattern).map_err(|err| SweepError::Config(format!("function path pattern: {err}")))
}

impl SweepMode for RpcMode {
    fn transport(&self) -> Transport {
        Transport::Rpc
    }

    fn scan(&self) -> CoverageUniverse {
        let mut universe = CoverageUniverse::new();
        universe.extend(
            RPC_RE
                .captures_iter(&self.proto)
                .enumerate()
                .map(|(ordinal, caps)| EndpointRecord::new(&caps[1], EndpointKind::Rpc, ordinal)),
        );
        universe
    }

    fn extract(&self, raw: &str) -> EnvPayloads {
        extract_value(raw, &self.variables_key, None)
    }

    fn normalize(&self, fixture: &FixtureRecord, _universe: &CoverageUniverse) -> Normalized {
        let method = self.method_name(fixture.target(Transport::Rpc));
        let mut normalized = Normalized {
            display: method.to_string(),
            ..Default::default()
        };
        if method.is_empty() {
            normalized.notes.push(UNRECOGNIZED_NOTE.to_string());
        } else {
            normalized.candidates.push(method.to_string());
        }
        normalized
    }

    fn correlate(&self, normalized: Normalized, universe: &mut CoverageUniverse) -> Correlation {
        match mark_first_declared(&normalized.candidates, universe) {
            Some(id) => Correlation {
                endpoint: id.clone(),
                canonical_id: Some(id),
                group_key: None,
                kind: String::new(),
                request_param: normalized.request_param,
                notes: normalized.notes,
            },
            None if normalized.candidates.is_empty() => Correlation::unmatched(normalized, ""),
            None => {
                let method = normalized.display.clone();
                Correlation {
                    group_key: Some(method),
                    ..Correlation::unmatched(normalized, NOT_FOUND_NOTE)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTO: &str = r#"
syntax = "proto3";

service Sampleapp {
    rpc GetProductDetail (ProductRequest) returns (ProductResponse);
    rpc GetProductInfo(ProductRequest) returns (ProductResponse);
    rpc  GetProductDetail (ProductRequest) returns (ProductResponse);
}

// grpc Ignored
"#;

    fn mode() -> RpcMode {
        let config = RpcConfig {
            repository: "sampleapp".into(),
            ..Default::default()
        };
        RpcMode::new(PROTO, &config).unwrap()
    }

    fn fixture(api_name: &str) -> FixtureRecord {
        FixtureRecord {
            api_name: api_name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_deduplicates_methods() {
        let universe = mode().scan();
        let names: Vec<&str> = universe.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, vec!["GetProductDetail", "GetProductInfo"]);
    }

    #[test]
    fn test_function_path_correlates() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture("{host}/function/sampleapp.Sampleapp.GetProductDetail/invoke");
        let outcome = mode.correlate(mode.normalize(&fixture, &universe), &mut universe);
        assert_eq!(outcome.canonical_id.as_deref(), Some("GetProductDetail"));
        assert_eq!(outcome.endpoint, "GetProductDetail");
        assert!(universe.get("GetProductDetail").unwrap().covered);
    }

    #[test]
    fn test_wrong_title_case_is_unrecognized() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture("{host}/function/sampleapp.sampleapp.GetProductDetail/invoke");
        let outcome = mode.correlate(mode.normalize(&fixture, &universe), &mut universe);
        assert!(!outcome.is_matched());
        assert_eq!(outcome.endpoint, "");
        assert_eq!(outcome.notes, vec![UNRECOGNIZED_NOTE]);
        assert_eq!(outcome.grouping_id(), None);
        assert_eq!(universe.covered_count(), 0);
    }

    #[test]
    fn test_undeclared_method_is_noted() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture("{host}/function/sampleapp.Sampleapp.Removed/invoke");
        let outcome = mode.correlate(mode.normalize(&fixture, &universe), &mut universe);
        assert_eq!(outcome.endpoint, "Removed");
        assert_eq!(outcome.notes, vec![NOT_FOUND_NOTE]);
        assert!(!outcome.is_matched());
        assert_eq!(outcome.grouping_id(), Some("Removed"));
    }

    #[test]
    fn test_repository_is_escaped() {
        let config = RpcConfig {
            repository: "a.b".into(),
            ..Default::default()
        };
        let mode = RpcMode::new("", &config).unwrap();
        assert_eq!(mode.method_name("{host}/function/a.b.A.B.Ping/invoke"), "Ping");
        assert_eq!(mode.method_name("{host}/function/aXb.A.B.Ping/invoke"), "");
    }
}

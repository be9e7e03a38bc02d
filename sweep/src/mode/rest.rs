//! REST mode: routes registered through handler calls.

use std::path::Path;

use itsweep_core::{CoverageUniverse, EndpointRecord, EnvPayloads, FixtureRecord, Transport, route_id};
use regex::Regex;
use tracing::debug;

use super::{SweepMode, read_source};
use crate::config::RestConfig;
use crate::correlate::{Correlation, Normalized, mark_first_declared};
use crate::error::{Result, SweepError};
use crate::extract::extract_value;
use crate::normalize::{
    has_route_params, route_payload, strip_host, substitute_placeholders, truncate_query,
};

/// Note for a fixture whose route is not registered.
pub const NOT_FOUND_NOTE: &str = "Not found in route file";

/// Sweeps routes declared as `r.Get("/path", handler)`.
#[derive(Debug, Clone)]
pub struct RestMode {
    routes: String,
    variables_key: String,
    pattern: Regex,
}

impl RestMode {
    /// Creates a mode over the given routes source text.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Config`] when the configured registrar or verbs
    /// do not form a valid pattern.
    pub fn new(routes: impl Into<String>, config: &RestConfig) -> Result<Self> {
        Ok(Self {
            routes: routes.into(),
            variables_key: config.variables_key.clone(),
            pattern: route_pattern(config)?,
        })
    }

    /// Creates a mode over the routes file at `path`.
    pub fn from_file(path: impl AsRef<Path>, config: &RestConfig) -> Result<Self> {
        Self::new(read_source(path), config)
    }
}

/// Builds `\b<registrar>\.(<Verb>|...)\("(/[A-Za-z0-9/_]*)`.
fn route_pattern(config: &RestConfig) -> Result<Regex> {
    let verbs: Vec<String> = config.verbs.iter().map(|verb| regex::escape(verb)).collect();
    let pattern = format!(
        r#"\b{}\.({})\("(/[A-Za-z0-9/_]*)"#,
        regex::escape(&config.registrar),
        verbs.join("|")
    );
    Regex::new(&pattern).map_err(|err| SweepError::Config(format!("route pattern: {err}")))
}

impl SweepMode for RestMode {
    fn transport(&self) -> Transport {
        Transport::Rest
    }

    fn scan(&self) -> CoverageUniverse {
        let mut universe = CoverageUniverse::new();
        for (ordinal, caps) in self.pattern.captures_iter(&self.routes).enumerate() {
            let record = EndpointRecord::route(&caps[1], &caps[2], ordinal);
            if !universe.insert(record) {
                debug!(verb = &caps[1], path = &caps[2], "duplicate route declaration");
            }
        }
        universe
    }

    fn extract(&self, raw: &str) -> EnvPayloads {
        extract_value(raw, &self.variables_key, None)
    }

    fn normalize(&self, fixture: &FixtureRecord, _universe: &CoverageUniverse) -> Normalized {
        let method = fixture.method();
        let target = strip_host(&fixture.api_name);

        let route = fixture
            .staging()
            .filter(|staging| has_route_params(&staging.api_param_map))
            .map(|staging| {
                let values = fixture
                    .production()
                    .map(|production| &production.api_param_map)
                    .unwrap_or(&staging.api_param_map);
                let path = substitute_placeholders(truncate_query(&target), values);
                (path, route_payload(&staging.api_param_map))
            });

        let (path, request_param) = match route {
            Some((path, payload)) => (path, Some(payload)),
            None => (target.clone(), None),
        };

        let mut candidates = vec![route_id(&method, &target)];
        let substituted = route_id(&method, &path);
        if !candidates.contains(&substituted) {
            candidates.push(substituted);
        }

        Normalized {
            candidates,
            display: path,
            kind: method,
            request_param,
            notes: Vec::new(),
        }
    }

    fn correlate(&self, normalized: Normalized, universe: &mut CoverageUniverse) -> Correlation {
        match mark_first_declared(&normalized.candidates, universe) {
            Some(id) => Correlation {
                canonical_id: Some(id),
                group_key: None,
                endpoint: normalized.display,
                kind: normalized.kind,
                request_param: normalized.request_param,
                notes: normalized.notes,
            },
            None => Correlation::unmatched(normalized, NOT_FOUND_NOTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"
func Routes(r *router.Router) {
    r.Get("/remind/list", h.List)
    r.Post("/remind/add", h.Add)
    r.Delete("/remind/{id}", h.Remove)
    r.Get("/remind/list", h.ListAgain)
    r.Put("/remind/edit", h.Edit)
    r.Get("/item/5", h.Item)
    router.Get("/not/registrar", h.Other)
}
"#;

    fn mode() -> RestMode {
        RestMode::new(ROUTES, &RestConfig::default()).unwrap()
    }

    fn fixture(method: &str, api_name: &str, params: &str) -> FixtureRecord {
        let raw = format!(
            r#"{{"queryName": "case", "httpMethod": "{method}", "apiName": "{api_name}",
                "structure": [{{"apiParamMap": {params}}}, {{"apiParamMap": {params}}}]}}"#
        );
        FixtureRecord::from_json("case.json", &raw).unwrap()
    }

    #[test]
    fn test_scan_default_verbs() {
        let universe = mode().scan();
        let ids: Vec<String> = universe.iter().map(|record| record.canonical_id()).collect();
        assert_eq!(
            ids,
            vec![
                "DELETE /remind/{id}",
                "GET /item/5",
                "GET /remind/list",
                "POST /remind/add"
            ]
        );
        assert!(!universe.contains("PUT /remind/edit"));
    }

    #[test]
    fn test_scan_put_when_configured() {
        let mut config = RestConfig::default();
        config.verbs.push("Put".to_string());
        let universe = RestMode::new(ROUTES, &config).unwrap().scan();
        assert!(universe.contains("PUT /remind/edit"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let mode = mode();
        assert_eq!(mode.scan(), mode.scan());
    }

    #[test]
    fn test_route_params_substitute_and_replace_payload() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture(
            "get",
            "{host}/item/{id}?verbose=1",
            r#"{"id": 5, "host": "h", "consulHost": "c"}"#,
        );

        let normalized = mode.normalize(&fixture, &universe);
        assert_eq!(normalized.display, "/item/5");
        assert_eq!(normalized.request_param.as_deref(), Some(r#"{"id": 5}"#));

        let outcome = mode.correlate(normalized, &mut universe);
        assert_eq!(outcome.canonical_id.as_deref(), Some("GET /item/5"));
        assert!(universe.get("GET /item/5").unwrap().covered);
    }

    #[test]
    fn test_raw_target_is_tried_first() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture(
            "DELETE",
            "{host}/remind/{id}",
            r#"{"id": 9, "host": "h", "consulHost": "c"}"#,
        );
        let outcome = mode.correlate(mode.normalize(&fixture, &universe), &mut universe);
        assert_eq!(outcome.canonical_id.as_deref(), Some("DELETE /remind/{id}"));
        assert_eq!(outcome.endpoint, "/remind/9");
    }

    #[test]
    fn test_two_params_keep_extracted_payload() {
        let mode = mode();
        let universe = mode.scan();
        let fixture = fixture("post", "{host}/remind/add", r#"{"host": "h", "consulHost": "c"}"#);
        let normalized = mode.normalize(&fixture, &universe);
        assert_eq!(normalized.request_param, None);
        assert_eq!(normalized.candidates, vec!["POST /remind/add"]);
    }

    #[test]
    fn test_unmatched_route_is_noted() {
        let mode = mode();
        let mut universe = mode.scan();
        let fixture = fixture("get", "{host}/unknown", "{}");
        let outcome = mode.correlate(mode.normalize(&fixture, &universe), &mut universe);
        assert!(!outcome.is_matched());
        assert_eq!(outcome.notes, vec![NOT_FOUND_NOTE]);
        assert_eq!(outcome.kind, "GET");
        assert_eq!(universe.covered_count(), 0);
    }

    #[test]
    fn test_missing_production_falls_back_to_staging_values() {
        let mode = mode();
        let universe = mode.scan();
        let raw = r#"{"httpMethod": "GET", "apiName": "{host}/item/{id}",
            "structure": [{"apiParamMap": {"id": 5.0, "host": "h", "consulHost": "c"}}]}"#;
        let fixture = FixtureRecord::from_json("one.json", raw).unwrap();
        let normalized = mode.normalize(&fixture, &universe);
        assert_eq!(normalized.display, "/item/5");
    }
}

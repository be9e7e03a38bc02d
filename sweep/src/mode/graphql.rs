//! GraphQL mode: query and mutation fields declared in schema resolvers.

use std::path::Path;
use std::sync::LazyLock;

use itsweep_core::{
    CoverageUniverse, EndpointKind, EndpointRecord, EnvPayloads, FixtureRecord, Transport,
};
use regex::Regex;

use super::{SweepMode, read_source};
use crate::config::GraphQlConfig;
use crate::correlate::{Correlation, Normalized, ambiguity_note, mark_first_declared};
use crate::extract::extract_value;
use crate::normalize::contains_token;

/// Endpoint text for a fixture whose query names no declared field.
pub const NOT_FOUND_ENDPOINT: &str = "Not found in queries/mutation file";

/// Type text for a fixture whose query names no declared field.
pub const NOT_FOUND_KIND: &str = "-";

/// Note for a fixture that is one step of a chained scenario.
pub const CHAIN_NOTE: &str = "Part of chain test case";

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]*)\([A-Za-z0-9_]*:*[A-Za-z0-9_ !,:\[\]]*\) *:")
        .expect("static regex must compile")
});

/// Returns the field names declared as `name(args): Type`, in source order.
///
/// # Examples
///
/// ```
/// use itsweep::mode::graphql::declared_fields;
///
/// let schema = "GetUser(id: Int!): User\nListUsers(): [User]\n(orphan): X";
/// assert_eq!(declared_fields(schema), vec!["GetUser", "ListUsers"]);
/// ```
pub fn declared_fields(source: &str) -> Vec<&str> {
    FIELD_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Sweeps fields declared in separate queries and mutations sources.
#[derive(Debug, Clone)]
pub struct GraphQlMode {
    queries: String,
    mutations: String,
    variables_key: String,
    null_marker: Option<String>,
}

impl GraphQlMode {
    pub fn new(queries: impl Into<String>, mutations: impl Into<String>, config: &GraphQlConfig) -> Self {
        Self {
            queries: queries.into(),
            mutations: mutations.into(),
            variables_key: config.variables_key.clone(),
            null_marker: config.null_marker.clone(),
        }
    }

    /// Creates a mode over the queries and mutations files.
    pub fn from_files(
        queries: impl AsRef<Path>,
        mutations: impl AsRef<Path>,
        config: &GraphQlConfig,
    ) -> Self {
        Self::new(read_source(queries), read_source(mutations), config)
    }
}

impl SweepMode for GraphQlMode {
    fn transport(&self) -> Transport {
        Transport::GraphQl
    }

    /// Queries are scanned before mutations, so a field declared in both
    /// keeps its query declaration.
    fn scan(&self) -> CoverageUniverse {
        let declarations = declared_fields(&self.queries)
            .into_iter()
            .map(|name| (name, EndpointKind::Query))
            .chain(
                declared_fields(&self.mutations)
                    .into_iter()
                    .map(|name| (name, EndpointKind::Mutation)),
            );

        let mut universe = CoverageUniverse::new();
        universe.extend(
            declarations
                .enumerate()
                .map(|(ordinal, (name, kind))| EndpointRecord::new(name, kind, ordinal)),
        );
        universe
    }

    fn extract(&self, raw: &str) -> EnvPayloads {
        extract_value(raw, &self.variables_key, self.null_marker.as_deref())
    }

    fn normalize(&self, fixture: &FixtureRecord, universe: &CoverageUniverse) -> Normalized {
        let query = fixture.target(Transport::GraphQl);
        let candidates: Vec<String> = universe
            .in_declaration_order()
            .into_iter()
            .filter(|record| contains_token(query, &record.name))
            .map(|record| record.canonical_id())
            .collect();

        let notes = candidates
            .first()
            .and_then(|chosen| ambiguity_note(&fixture.file_name(), chosen, &candidates))
            .into_iter()
            .collect();

        Normalized {
            candidates,
            display: NOT_FOUND_ENDPOINT.to_string(),
            kind: NOT_FOUND_KIND.to_string(),
            request_param: None,
            notes,
        }
    }

    fn correlate(&self, normalized: Normalized, universe: &mut CoverageUniverse) -> Correlation {
        let Some(id) = mark_first_declared(&normalized.candidates, universe) else {
            return Correlation::unmatched(normalized, CHAIN_NOTE);
        };
        let kind = universe
            .get(&id)
            .map(|record| record.kind.type_label().to_string())
            .unwrap_or_default();
        Correlation {
            endpoint: id.clone(),
            canonical_id: Some(id),
            group_key: None,
            kind,
            request_param: normalized.request_param,
            notes: normalized.notes,
        }
    }
}

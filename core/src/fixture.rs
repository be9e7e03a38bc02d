//! Recorded integration-test fixtures.
//!
//! A fixture is one JSON document describing a request/response exchange
//! against an endpoint, with one `structure` entry per environment. Only the
//! fields the sweep consumes are modeled. Deserialization is lenient: a
//! missing field or a field of the wrong JSON type falls back to its default
//! instead of rejecting the whole document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Transport;

/// Index of the staging entry in [`FixtureRecord::structure`].
pub const STAGING_INDEX: usize = 0;

/// Index of the production entry in [`FixtureRecord::structure`].
pub const PRODUCTION_INDEX: usize = 1;

/// One environment block of a fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    #[serde(default, deserialize_with = "lenient::string")]
    pub env: String,
    #[serde(default, deserialize_with = "lenient::code")]
    pub response_code: i64,
    #[serde(default, deserialize_with = "lenient::object")]
    pub api_param_map: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub response_string: Value,
}

/// A parsed fixture document.
///
/// # Examples
///
/// ```
/// use itsweep_core::FixtureRecord;
///
/// let raw = r#"{
///     "queryName": "add reminder",
///     "httpMethod": "post",
///     "apiName": "{host}/remind/add",
///     "structure": [
///         {"env": "staging", "responseCode": 200, "apiParamMap": {"host": "h"}}
///     ]
/// }"#;
/// let fixture = FixtureRecord::from_json("cases/add.json", raw).unwrap();
/// assert_eq!(fixture.query_name, "add reminder");
/// assert_eq!(fixture.staging().unwrap().response_code, 200);
/// assert!(fixture.production().is_none());
/// assert_eq!(fixture.file_name(), "add.json");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRecord {
    /// Path the fixture was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
    /// Declared test name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub query_name: String,
    /// HTTP verb (REST and RPC fixtures).
    #[serde(default, deserialize_with = "lenient::string")]
    pub http_method: String,
    /// Raw request target, e.g. `{host}/remind/add`.
    #[serde(default, deserialize_with = "lenient::string")]
    pub api_name: String,
    /// Full GraphQL query text.
    #[serde(default, deserialize_with = "lenient::string")]
    pub query: String,
    /// Per-environment blocks; index 0 is staging, index 1 production.
    #[serde(default, deserialize_with = "lenient::structures")]
    pub structure: Vec<Structure>,
}

impl FixtureRecord {
    /// Parses a fixture document.
    ///
    /// # Errors
    ///
    /// Returns an error only when `raw` is not syntactically valid JSON;
    /// type mismatches inside the document are absorbed.
    pub fn from_json(path: impl AsRef<Path>, raw: &str) -> Result<Self, serde_json::Error> {
        let mut record: FixtureRecord = serde_json::from_str(raw)?;
        record.path = path.as_ref().to_path_buf();
        Ok(record)
    }

    /// Zero-valued record for a fixture that could not be read or parsed.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Returns the staging block, if present.
    pub fn staging(&self) -> Option<&Structure> {
        self.structure.get(STAGING_INDEX)
    }

    /// Returns the production block, if present.
    pub fn production(&self) -> Option<&Structure> {
        self.structure.get(PRODUCTION_INDEX)
    }

    /// Returns the block at `index`, if present.
    pub fn environment(&self, index: usize) -> Option<&Structure> {
        self.structure.get(index)
    }

    /// Base file name of the fixture path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Uppercased HTTP verb.
    pub fn method(&self) -> String {
        self.http_method.to_ascii_uppercase()
    }

    /// The transport-specific target reference: the query text for GraphQL,
    /// the API name otherwise.
    pub fn target(&self, transport: Transport) -> &str {
        match transport {
            Transport::GraphQl => &self.query,
            Transport::Rest | Transport::Rpc => &self.api_name,
        }
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    use super::Structure;

    pub(super) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(value) => value,
            _ => String::new(),
        })
    }

    pub(super) fn code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value as i64))
                .unwrap_or_default(),
            Value::String(value) => value.trim().parse().unwrap_or_default(),
            _ => 0,
        })
    }

    pub(super) fn object<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Map<String, Value>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    pub(super) fn structures<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Structure>, D::Error> {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect())
    }
}

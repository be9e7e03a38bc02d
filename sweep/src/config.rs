//! Sweep configuration.
//!
//! Defines the YAML-serializable configuration that tunes the declaration
//! patterns, payload extraction keys, uncovered-endpoint exclusions and the
//! Postman export. Every section is optional; omitted values take the
//! defaults shown below.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! rest:
//!   registrar: r
//!   verbs: [Get, Delete, Patch, Post, Put]
//! graphql:
//!   null_marker: '"variables": null'
//! rpc:
//!   repository: sampleapp
//! report:
//!   exclusions:
//!     - contains: intools
//!       status: Wont Do
//!       notes: Intools
//! postman:
//!   name: sampleapp-API
//!   success_only: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use itsweep_core::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Current configuration format version.
pub const CONFIG_VERSION: &str = "1.0";

/// Placeholder for the service host inside fixture targets.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Parameter-map keys that never become route variables.
pub const RESERVED_PARAMS: &[&str] = &["host", "consulHost"];

/// REST declaration and normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Receiver of the route-registration calls (`r` in `r.Get("/x", h)`).
    pub registrar: String,
    /// Registration methods recognized as routes, as written in source.
    pub verbs: Vec<String>,
    /// Key whose object value is reported as the request parameters.
    pub variables_key: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            registrar: "r".to_string(),
            verbs: ["Get", "Delete", "Patch", "Post"]
                .into_iter()
                .map(String::from)
                .collect(),
            variables_key: "variables".to_string(),
        }
    }
}

/// GraphQL extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphQlConfig {
    /// Key whose object value is reported as the request parameters.
    pub variables_key: String,
    /// Text meaning "variables are explicitly null"; disables extraction.
    pub null_marker: Option<String>,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            variables_key: "\"variables\":".to_string(),
            null_marker: Some("\"variables\": null".to_string()),
        }
    }
}

/// RPC normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Repository name used in `{host}/function/<repo>.<Repo>.<Method>/invoke`.
    pub repository: String,
    /// Key whose object value is reported as the request parameters.
    pub variables_key: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            variables_key: "variables".to_string(),
        }
    }
}

/// Status override for uncovered endpoints whose identifier contains a
/// substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub contains: String,
    pub status: Status,
    #[serde(default)]
    pub notes: String,
}

impl ExclusionRule {
    pub fn matches(&self, canonical_id: &str) -> bool {
        !self.contains.is_empty() && canonical_id.contains(&self.contains)
    }
}

/// Report assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rules applied, first match wins, to uncovered-endpoint rows.
    pub exclusions: Vec<ExclusionRule>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            exclusions: vec![ExclusionRule {
                contains: "intools".to_string(),
                status: Status::WontDo,
                notes: "Intools".to_string(),
            }],
        }
    }
}

impl ReportConfig {
    /// Returns the first exclusion rule matching `canonical_id`.
    pub fn exclusion_for(&self, canonical_id: &str) -> Option<&ExclusionRule> {
        self.exclusions.iter().find(|rule| rule.matches(canonical_id))
    }
}

/// Postman collection export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmanConfig {
    pub name: String,
    pub description: String,
    /// Export only environments whose recorded response code is 200.
    pub success_only: bool,
    /// Concrete staging host URL; `None` uses the `{{hostStaging}}` variable.
    pub host_staging: Option<String>,
    /// Concrete production host URL; `None` uses the `{{hostProd}}` variable.
    pub host_prod: Option<String>,
    /// Host used by the local folder.
    pub host_local: String,
    /// Key whose object value becomes the request body or query string.
    pub variables_key: String,
}

impl Default for PostmanConfig {
    fn default() -> Self {
        Self {
            name: "API collection".to_string(),
            description: "Collection scraped from integration test".to_string(),
            success_only: false,
            host_staging: None,
            host_prod: None,
            host_local: "{{localhost}}".to_string(),
            variables_key: "variables".to_string(),
        }
    }
}

/// Top-level sweep configuration.
///
/// # Examples
///
/// ```
/// use itsweep::config::SweepConfig;
///
/// let config: SweepConfig = serde_yaml::from_str("rpc: { repository: sampleapp }").unwrap();
/// assert_eq!(config.rpc.repository, "sampleapp");
/// assert_eq!(config.rest.registrar, "r");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub version: String,
    pub rest: RestConfig,
    pub graphql: GraphQlConfig,
    pub rpc: RpcConfig,
    pub report: ReportConfig,
    pub postman: PostmanConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            rest: RestConfig::default(),
            graphql: GraphQlConfig::default(),
            rpc: RpcConfig::default(),
            report: ReportConfig::default(),
            postman: PostmanConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](SweepError::Io) if the file cannot be read,
    /// [`Yaml`](SweepError::Yaml) if parsing fails, or
    /// [`Config`](SweepError::Config) if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: SweepConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks values that would make declaration patterns meaningless.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.rest.registrar) {
            return Err(SweepError::Config(format!(
                "rest.registrar '{}' must be an identifier",
                self.rest.registrar
            )));
        }
        if self.rest.verbs.is_empty() {
            return Err(SweepError::Config("rest.verbs must not be empty".to_string()));
        }
        if let Some(verb) = self.rest.verbs.iter().find(|verb| !is_identifier(verb)) {
            return Err(SweepError::Config(format!(
                "rest.verbs entry '{verb}' must be an identifier"
            )));
        }
        for (section, key) in [
            ("rest", &self.rest.variables_key),
            ("graphql", &self.graphql.variables_key),
            ("rpc", &self.rpc.variables_key),
            ("postman", &self.postman.variables_key),
        ] {
            if key.is_empty() {
                return Err(SweepError::Config(format!(
                    "{section}.variables_key must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

//! Postman collection export.
//!
//! Rebuilds one request per fixture environment and groups them into
//! `Staging`, `Production` and `Local` folders of a v2.1.0 collection. The
//! local folder mirrors the staging requests against a local host.

use std::io::BufWriter;
use std::path::Path;

use itsweep_core::{ExtractedPayload, Structure};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PostmanConfig;
use crate::error::Result;
use crate::extract::extract_value;
use crate::loader::LoadedFixture;
use crate::normalize::{
    has_route_params, render_literal, strip_host, substitute_placeholders, truncate_query,
};

/// Collection schema identifier written into `info.schema`.
pub const SCHEMA_V210: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Host variable used for staging requests when no concrete host is set.
pub const DEFAULT_HOST_STAGING: &str = "{{hostStaging}}";

/// Host variable used for production requests when no concrete host is set.
pub const DEFAULT_HOST_PROD: &str = "{{hostProd}}";

/// HTTP methods that can be rebuilt into requests.
pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PATCH", "DELETE", "PUT"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: CollectionInfo,
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub item: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub auth: Auth,
    /// Always present, possibly empty; the schema requires the field.
    pub header: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    pub url: RequestUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Auth {
    pub fn none() -> Self {
        Self {
            kind: "noauth".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub raw: String,
}

impl Body {
    pub fn raw(text: &str) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestUrl {
    pub raw: String,
    pub protocol: String,
    pub host: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

impl Collection {
    /// Returns the folder named `name`.
    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.item.iter().find(|folder| folder.name == name)
    }

    /// Writes the collection as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Environment block a request is rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Environment {
    Staging,
    Production,
}

impl Environment {
    fn index(self) -> usize {
        match self {
            Self::Staging => itsweep_core::STAGING_INDEX,
            Self::Production => itsweep_core::PRODUCTION_INDEX,
        }
    }
}

/// Host settings for one environment.
struct HostSpec<'a> {
    base: &'a str,
    concrete: bool,
}

impl<'a> HostSpec<'a> {
    fn new(configured: Option<&'a str>, fallback: &'a str) -> Self {
        match configured.filter(|host| !host.is_empty()) {
            Some(host) => Self {
                base: host,
                concrete: true,
            },
            None => Self {
                base: fallback,
                concrete: false,
            },
        }
    }
}

/// Builds a collection from fixtures in walk order.
///
/// # Examples
///
/// ```
/// use itsweep::config::PostmanConfig;
/// use itsweep::loader::LoadedFixture;
/// use itsweep::postman::build_collection;
/// use itsweep_core::FixtureRecord;
///
/// let raw = r#"{"queryName": "add", "httpMethod": "POST", "apiName": "{host}/remind/add",
///     "structure": [{"responseCode": 200, "variables": {"id": 1}}]}"#;
/// let fixture = LoadedFixture {
///     record: FixtureRecord::from_json("add.json", raw).unwrap(),
///     raw: raw.to_string(),
/// };
///
/// let collection = build_collection(&[fixture], &PostmanConfig::default());
/// let staging = collection.folder("Staging").unwrap();
/// assert_eq!(staging.item[0].name, "[200] add");
/// assert_eq!(staging.item[0].request.body.as_ref().unwrap().raw, r#"{"id": 1}"#);
/// assert!(collection.folder("Production").unwrap().item.is_empty());
/// ```
pub fn build_collection(fixtures: &[LoadedFixture], config: &PostmanConfig) -> Collection {
    let staging_host = HostSpec::new(config.host_staging.as_deref(), DEFAULT_HOST_STAGING);
    let prod_host = HostSpec::new(config.host_prod.as_deref(), DEFAULT_HOST_PROD);

    let mut staging = Vec::new();
    let mut production = Vec::new();
    let mut local = Vec::new();

    for fixture in fixtures {
        let payloads = extract_value(&fixture.raw, &config.variables_key, None);

        if let Some((item, path)) = build_item(
            fixture,
            Environment::Staging,
            &payloads.staging,
            &staging_host,
            config,
        ) {
            local.push(local_copy(&item, staging_host.base, &config.host_local, &path));
            staging.push(item);
        }
        if let Some((item, _)) = build_item(
            fixture,
            Environment::Production,
            &payloads.production,
            &prod_host,
            config,
        ) {
            production.push(item);
        }
    }

    info!(
        fixtures = fixtures.len(),
        staging = staging.len(),
        production = production.len(),
        "postman collection built"
    );

    Collection {
        info: CollectionInfo {
            name: config.name.clone(),
            description: config.description.clone(),
            schema: SCHEMA_V210.to_string(),
        },
        item: vec![
            Folder {
                name: "Staging".to_string(),
                item: staging,
            },
            Folder {
                name: "Production".to_string(),
                item: production,
            },
            Folder {
                name: "Local".to_string(),
                item: local,
            },
        ],
    }
}

/// Rebuilds the request for one environment; returns it with the
/// substituted path.
fn build_item(
    fixture: &LoadedFixture,
    env: Environment,
    payload: &ExtractedPayload,
    host: &HostSpec<'_>,
    config: &PostmanConfig,
) -> Option<(Item, String)> {
    let record = &fixture.record;
    let structure = record.environment(env.index())?;
    if config.success_only && structure.response_code != 200 {
        debug!(path = %fixture.path().display(), code = structure.response_code, "skipping unsuccessful case");
        return None;
    }

    let method = record.method();
    if !SUPPORTED_METHODS.contains(&method.as_str()) {
        warn!(path = %fixture.path().display(), method = %method, "unsupported HTTP method, skipping");
        return None;
    }

    let mut path = strip_host(&record.api_name);
    if has_route_params(&structure.api_param_map) {
        path = substitute_placeholders(&path, &structure.api_param_map);
    }

    let mut raw = format!("{}{path}", host.base);
    let mut body = None;
    if method == "GET" {
        if let Some(query) = query_string(structure, payload) {
            raw.push(if path.contains('?') { '&' } else { '?' });
            raw.push_str(&query);
        }
    } else if !payload.is_empty_object() {
        body = Some(Body::raw(payload.as_str()));
    }

    let url = request_url(raw, &path, host);
    let item = Item {
        name: format!("[{}] {}", structure.response_code, record.query_name),
        request: Request {
            method,
            auth: Auth::none(),
            header: Vec::new(),
            body,
            url,
        },
    };
    Some((item, path))
}

/// Query string built from the environment's variables, or `None` when the
/// fixture sends no variables.
fn query_string(structure: &Structure, payload: &ExtractedPayload) -> Option<String> {
    if payload.is_empty_object() || structure.variables.is_empty() {
        return None;
    }
    let pairs: Vec<String> = structure
        .variables
        .iter()
        .map(|(key, value)| format!("{key}={}", render_literal(value)))
        .collect();
    Some(pairs.join("&").replace('"', "\\\""))
}

fn query_params(raw: &str) -> Vec<QueryParam> {
    let Some((_, query)) = raw.split_once('?') else {
        return Vec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| QueryParam {
            key: key.into_owned(),
            value: value.into_owned(),
        })
        .collect()
}

fn path_segments(path: &str) -> Vec<String> {
    truncate_query(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

fn request_url(raw: String, path: &str, host: &HostSpec<'_>) -> RequestUrl {
    let query = query_params(&raw);
    let mut url = RequestUrl {
        raw,
        protocol: "http".to_string(),
        host: vec![host.base.to_string()],
        port: None,
        path: path_segments(path),
        query,
    };

    if host.concrete {
        match Url::parse(&url.raw) {
            Ok(parsed) => {
                url.host = parsed
                    .host_str()
                    .map(|name| name.split('.').map(String::from).collect())
                    .unwrap_or_default();
                url.path = path_segments(parsed.path());
                url.port = parsed.port().map(|port| port.to_string());
            }
            Err(err) => {
                warn!(url = %url.raw, error = %err, "cannot parse request URL, keeping host as given");
            }
        }
    }
    url
}

fn local_copy(item: &Item, staging_host: &str, local_host: &str, path: &str) -> Item {
    let mut copy = item.clone();
    copy.request.url.raw = item.request.url.raw.replacen(staging_host, local_host, 1);
    copy.request.url.host = vec![local_host.to_string()];
    copy.request.url.port = None;
    copy.request.url.path = path_segments(path);
    copy
}

use std::fs;
use std::path::Path;

use itsweep::config::{ExclusionRule, SweepConfig};
use itsweep::loader::{fixture_paths, load_fixtures};
use itsweep::output::{OutputFormat, format_report};
use itsweep::postman::build_collection;
use itsweep::{GraphQlMode, RestMode, RpcMode, SweepError, run_sweep};
use itsweep_core::{RowGroup, Status};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ROUTES: &str = r#"
func Register(r *router.Router) {
    r.Get("/remind/list", h.List)
    r.Post("/remind/add", h.Add)
    r.Get("/item/5", h.Item)
    r.Delete("/intools/purge", h.Purge)
}
"#;

const QUERIES: &str = r#"
type Query {
    GetProductDetail(productId: Int!): Product
    ListProducts(): [Product]
}
"#;

const MUTATIONS: &str = r#"
type Mutation {
    AddToCart(productId: Int!, qty: Int!): Cart
}
"#;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn rest_fixture(name: &str, method: &str, api_name: &str, params: &str, variables: &str) -> String {
    format!(
        r#"{{
    "queryName": "{name}",
    "httpMethod": "{method}",
    "apiName": "{api_name}",
    "structure": [
        {{"env": "staging", "responseCode": 200, "apiParamMap": {params}, "variables": {variables}}},
        {{"env": "production", "responseCode": 200, "apiParamMap": {params}, "variables": {variables}}}
    ]
}}"#
    )
}

fn graphql_fixture(name: &str, query: &str, variables: &str) -> String {
    format!(
        r#"{{"queryName": "{name}", "query": "{query}",
    "structure": [{{"responseCode": 200, "variables": {variables}}}, {{"responseCode": 200, "variables": {variables}}}]}}"#
    )
}

fn rest_mode() -> RestMode {
    RestMode::new(ROUTES, &SweepConfig::default().rest).unwrap()
}

// ---------------------------------------------------------------------------
// Fixture walking
// ---------------------------------------------------------------------------

#[test]
fn test_fixture_walk_uses_literal_suffix() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.json", "{}");
    write(dir.path(), "casejson", "{}");
    write(dir.path(), "notes.txt", "{}");
    write(dir.path(), "subjson/inner.json", "{}");

    let names: Vec<String> = fixture_paths(dir.path())
        .unwrap()
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "casejson", "inner.json"]);

    let report = run_sweep(&rest_mode(), dir.path(), &SweepConfig::default()).unwrap();
    assert_eq!(report.summary.fixtures, 3);
    assert_eq!(report.fixture_rows().len(), 3);
}

#[test]
fn test_missing_fixture_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_sweep(&rest_mode(), dir.path().join("absent"), &SweepConfig::default())
        .unwrap_err();
    assert!(matches!(err, SweepError::InvalidInput(_)));
}

// ---------------------------------------------------------------------------
// REST
// ---------------------------------------------------------------------------

#[test]
fn test_rest_sweep_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a_add.json",
        &rest_fixture("add", "post", "{host}/remind/add", r#"{"host": "h"}"#, r#"{"text": "hi"}"#),
    );
    write(
        dir.path(),
        "b_add_again.json",
        &rest_fixture("add again", "POST", "{host}/remind/add", r#"{"host": "h"}"#, r#"{"text": "x"}"#),
    );
    write(
        dir.path(),
        "c_item.json",
        &rest_fixture(
            "item",
            "get",
            "{host}/item/{id}?verbose=1",
            r#"{"id": 5, "host": "h", "consulHost": "c"}"#,
            "{}",
        ),
    );
    write(
        dir.path(),
        "d_missing.json",
        &rest_fixture("missing", "get", "{host}/nowhere", r#"{"host": "h"}"#, "{}"),
    );
    write(
        dir.path(),
        "e_add_late.json",
        &rest_fixture("add late", "post", "{host}/remind/add", r#"{"host": "h"}"#, "{}"),
    );

    let report = run_sweep(&rest_mode(), dir.path(), &SweepConfig::default()).unwrap();

    let rows = report.fixture_rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].endpoint, "/remind/add");
    assert_eq!(rows[0].kind, "POST");
    assert_eq!(rows[0].request_param, r#"{"text": "hi"}"#);
    assert_eq!(rows[0].expected_response, Some(200));
    assert_eq!(rows[0].status, Status::Live);

    assert_eq!(rows[2].endpoint, "/item/5");
    assert_eq!(rows[2].canonical_id, "GET /item/5");
    assert_eq!(rows[2].request_param, r#"{"id": 5}"#);

    assert!(!rows[3].matched);
    assert_eq!(rows[3].notes, "Not found in route file");
    assert_eq!(rows[3].request_param, "{}");

    // The late duplicate is separated by an unmatched row, so it opens no group.
    assert_eq!(report.groups, vec![RowGroup { start: 0, end: 1 }]);

    let uncovered: Vec<(&str, &str, Status)> = report
        .uncovered_rows()
        .iter()
        .map(|row| (row.endpoint.as_str(), row.kind.as_str(), row.status))
        .collect();
    assert_eq!(
        uncovered,
        vec![
            ("/intools/purge", "DELETE", Status::WontDo),
            ("/remind/list", "GET", Status::NoTestCase),
        ]
    );
    assert_eq!(report.summary.declared, 4);
    assert_eq!(report.summary.covered, 2);
    assert_eq!(report.summary.matched, 4);
    assert_eq!(report.summary.unmatched, 1);
}

#[test]
fn test_malformed_fixture_still_produces_a_row() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.json", "{ \"queryName\": ");
    write(dir.path(), "empty.json", "");

    let report = run_sweep(&rest_mode(), dir.path(), &SweepConfig::default()).unwrap();
    let rows = report.fixture_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].file_name, "broken.json");
    assert_eq!(rows[1].file_name, "empty.json");
    assert!(rows.iter().all(|row| !row.matched));
    assert!(rows.iter().all(|row| row.expected_response.is_none()));
    assert_eq!(report.summary.covered, 0);
}

#[test]
fn test_custom_exclusions_replace_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SweepConfig::default();
    config.report.exclusions = vec![ExclusionRule {
        contains: "/remind/".to_string(),
        status: Status::Pending,
        notes: "Reminders paused".to_string(),
    }];

    let report = run_sweep(&rest_mode(), dir.path(), &config).unwrap();
    let statuses: Vec<(&str, Status)> = report
        .uncovered_rows()
        .iter()
        .map(|row| (row.canonical_id.as_str(), row.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("DELETE /intools/purge", Status::NoTestCase),
            ("GET /item/5", Status::NoTestCase),
            ("GET /remind/list", Status::Pending),
            ("POST /remind/add", Status::Pending),
        ]
    );
    assert_eq!(report.uncovered_rows()[2].notes, "Reminders paused");
}

// ---------------------------------------------------------------------------
// GraphQL
// ---------------------------------------------------------------------------

#[test]
fn test_graphql_sweep_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a_detail.json",
        &graphql_fixture(
            "detail",
            "query { GetProductDetail(productId: 1) { id } }",
            r#"{"productId": 1}"#,
        ),
    );
    write(
        dir.path(),
        "b_detail_null.json",
        &graphql_fixture("detail null", "query { GetProductDetail { id } }", "null"),
    );
    write(
        dir.path(),
        "c_login.json",
        &graphql_fixture("login", "mutation { Login { token } }", "{}"),
    );
    write(
        dir.path(),
        "d_both.json",
        &graphql_fixture(
            "both",
            "mutation { AddToCart(productId: 1) { id } GetProductDetail { id } }",
            "{}",
        ),
    );

    let mode = GraphQlMode::new(QUERIES, MUTATIONS, &SweepConfig::default().graphql);
    let report = run_sweep(&mode, dir.path(), &SweepConfig::default()).unwrap();
    let rows = report.fixture_rows();

    assert_eq!(rows[0].endpoint, "GetProductDetail");
    assert_eq!(rows[0].kind, "Queries");
    assert_eq!(rows[0].request_param, r#"{"productId": 1}"#);
    assert!(rows[0].query.contains("GetProductDetail(productId: 1)"));

    assert_eq!(rows[1].request_param, "null");
    assert_eq!(report.groups, vec![RowGroup { start: 0, end: 1 }]);

    assert!(!rows[2].matched);
    assert_eq!(rows[2].endpoint, "Not found in queries/mutation file");
    assert_eq!(rows[2].kind, "-");
    assert_eq!(rows[2].notes, "Part of chain test case");

    // Declaration order decides an ambiguous query; the others are noted.
    assert_eq!(rows[3].endpoint, "GetProductDetail");
    assert!(rows[3].notes.contains("AddToCart"));

    let uncovered: Vec<&str> = report
        .uncovered_rows()
        .iter()
        .map(|row| row.endpoint.as_str())
        .collect();
    assert_eq!(uncovered, vec!["AddToCart", "ListProducts"]);
    assert_eq!(report.summary.unmatched, 1);
}

// ---------------------------------------------------------------------------
// RPC
// ---------------------------------------------------------------------------

#[test]
fn test_rpc_sweep_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = |api_name: &str| {
        format!(
            r#"{{"queryName": "case", "httpMethod": "POST", "apiName": "{api_name}",
    "structure": [{{"responseCode": 200, "variables": {{"productId": 1}}}}]}}"#
        )
    };
    write(
        dir.path(),
        "a.json",
        &fixture("{host}/function/sampleapp.Sampleapp.GetProductDetail/invoke"),
    );
    write(
        dir.path(),
        "b.json",
        &fixture("{host}/function/sampleapp.SampleApp.GetProductDetail/invoke"),
    );
    write(
        dir.path(),
        "c.json",
        &fixture("{host}/function/sampleapp.Sampleapp.DeleteProduct/invoke"),
    );
    write(
        dir.path(),
        "d.json",
        &fixture("{host}/function/sampleapp.Sampleapp.DeleteProduct/invoke"),
    );

    let mut config = SweepConfig::default();
    config.rpc.repository = "sampleapp".to_string();
    let proto = "service Sampleapp {\n  rpc GetProductDetail(Req) returns (Res);\n  rpc GetProductInfo(Req) returns (Res);\n}\n";
    let mode = RpcMode::new(proto, &config.rpc).unwrap();

    let report = run_sweep(&mode, dir.path(), &config).unwrap();
    let rows = report.fixture_rows();

    assert_eq!(rows[0].endpoint, "GetProductDetail");
    assert_eq!(rows[0].request_param, r#"{"productId": 1}"#);
    assert_eq!(rows[1].endpoint, "");
    assert_eq!(rows[1].notes, "Unrecognized function path");
    assert_eq!(rows[2].endpoint, "DeleteProduct");
    assert_eq!(rows[2].notes, "Not found in proto file");
    assert!(!rows[3].matched);

    // Undeclared calls to the same method still merge; nothing is covered by them.
    assert_eq!(report.groups, vec![RowGroup { start: 2, end: 3 }]);

    assert_eq!(report.uncovered_rows().len(), 1);
    assert_eq!(report.uncovered_rows()[0].endpoint, "GetProductInfo");
    assert_eq!(report.summary.coverage, 0.5);

    let table = format_report(&report, OutputFormat::Table).unwrap();
    assert!(table.contains("GetProductInfo"));
    assert!(!table.contains("Type"));
}

// ---------------------------------------------------------------------------
// Postman
// ---------------------------------------------------------------------------

#[test]
fn test_postman_export_from_corpus() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a_list.json",
        &rest_fixture("list", "get", "{host}/remind/list", r#"{"host": "h"}"#, r#"{"page": 2}"#),
    );
    write(
        dir.path(),
        "b_add.json",
        &rest_fixture("add", "post", "{host}/remind/add", r#"{"host": "h"}"#, r#"{"text": "hi"}"#),
    );
    write(dir.path(), "c_broken.json", "not json");

    let fixtures = load_fixtures(dir.path()).unwrap();
    assert_eq!(fixtures.len(), 3);

    let mut config = SweepConfig::default().postman;
    config.host_staging = Some("http://sampleapp.service.staging.consul:9000".to_string());
    let collection = build_collection(&fixtures, &config);

    let staging = collection.folder("Staging").unwrap();
    assert_eq!(staging.item.len(), 2);
    let list = &staging.item[0].request;
    assert_eq!(list.url.raw, "http://sampleapp.service.staging.consul:9000/remind/list?page=2");
    assert_eq!(list.url.host, vec!["sampleapp", "service", "staging", "consul"]);
    assert_eq!(list.url.port.as_deref(), Some("9000"));
    assert!(list.body.is_none());

    let add = &staging.item[1].request;
    assert_eq!(add.body.as_ref().unwrap().raw, r#"{"text": "hi"}"#);

    let production = collection.folder("Production").unwrap();
    assert_eq!(production.item[0].request.url.raw, "{{hostProd}}/remind/list?page=2");

    let local = collection.folder("Local").unwrap();
    assert_eq!(local.item[0].request.url.raw, "{{localhost}}/remind/list?page=2");
    assert_eq!(local.item[0].request.url.path, vec!["remind", "list"]);

    let out = dir.path().join("collection.json");
    collection.save(&out).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["item"][2]["name"], "Local");
}

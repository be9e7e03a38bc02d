//! Integration-test coverage sweeps.
//!
//! This crate reconciles the endpoints a service declares in source against
//! a corpus of recorded integration-test fixtures, and reports which
//! endpoints are exercised, which are not, and what each test sends.
//!
//! Three transports are supported, each as a [`SweepMode`]:
//!
//! - [`RestMode`]: routes registered as `r.Get("/path", handler)`.
//! - [`GraphQlMode`]: `name(args): Type` fields in a queries file and a
//!   mutations file.
//! - [`RpcMode`]: `rpc Method` declarations, invoked through
//!   `{host}/function/<repo>.<Repo>.<Method>/invoke`.
//!
//! # Main entry points
//!
//! - [`run_sweep`]: scan, walk the fixtures, correlate, and build a
//!   [`CoverageReport`].
//! - [`output::format_report`]: render a report as JSON, YAML, Markdown or
//!   an aligned text table.
//! - [`postman::build_collection`]: rebuild the fixtures as a Postman
//!   collection.
//!
//! # Example
//!
//! ```
//! use itsweep::{RpcMode, SweepConfig, run_sweep};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("detail.json"),
//!     r#"{"queryName": "detail", "apiName": "{host}/function/sampleapp.Sampleapp.GetProductDetail/invoke",
//!         "structure": [{"responseCode": 200, "variables": {"productId": 1}}]}"#,
//! )
//! .unwrap();
//!
//! let mut config = SweepConfig::default();
//! config.rpc.repository = "sampleapp".to_string();
//! let proto = "rpc GetProductDetail(Req) returns (Res);\nrpc GetProductInfo(Req) returns (Res);";
//! let mode = RpcMode::new(proto, &config.rpc).unwrap();
//!
//! let report = run_sweep(&mode, dir.path(), &config).unwrap();
//! assert_eq!(report.summary.covered, 1);
//! assert_eq!(report.rows[0].request_param, r#"{"productId": 1}"#);
//! assert_eq!(report.rows[1].endpoint, "GetProductInfo");
//! ```

pub mod config;
pub mod correlate;
pub mod error;
pub mod extract;
pub mod loader;
pub mod mode;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod postman;
pub mod report;

pub use config::SweepConfig;
pub use error::{Result, SweepError};
pub use mode::{GraphQlMode, RestMode, RpcMode, SweepMode};
pub use pipeline::run_sweep;
pub use report::{CoverageReport, ReportSummary};

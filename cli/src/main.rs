use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use itsweep::loader::load_fixtures;
use itsweep::output::{OutputFormat, format_report};
use itsweep::postman::build_collection;
use itsweep::{CoverageReport, GraphQlMode, RestMode, RpcMode, SweepConfig, SweepMode, run_sweep};
use itsweep_core::Transport;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "itsweep", version)]
#[command(about = "Reconcile declared API endpoints against recorded integration-test fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sweep HTTP routes registered in a routes source file.
    Rest(RestArgs),
    /// Sweep GraphQL fields declared in queries and mutations files.
    Graphql(GraphQlArgs),
    /// Sweep RPC methods declared in a proto file.
    Rpc(RpcArgs),
    /// Export the fixtures as a Postman v2.1 collection.
    Postman(PostmanArgs),
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Directory containing the fixture corpus.
    #[arg(long)]
    fixtures: PathBuf,
    /// Path to an itsweep YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value = "markdown")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct RestArgs {
    /// Source file registering the routes (e.g. http.go).
    #[arg(long)]
    routes: PathBuf,
    /// Receiver of the route registration calls.
    #[arg(long)]
    registrar: Option<String>,
    /// Also recognize `Put` registrations.
    #[arg(long)]
    include_put: bool,
    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Debug, Args)]
struct GraphQlArgs {
    /// Schema file declaring the query fields.
    #[arg(long)]
    queries: PathBuf,
    /// Schema file declaring the mutation fields.
    #[arg(long)]
    mutations: PathBuf,
    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Debug, Args)]
struct RpcArgs {
    /// Proto file declaring the RPC methods.
    #[arg(long)]
    proto: PathBuf,
    /// Repository name used in function-gateway paths.
    #[arg(long)]
    repository: Option<String>,
    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Debug, Args)]
struct PostmanArgs {
    /// Directory containing the fixture corpus.
    #[arg(long)]
    fixtures: PathBuf,
    /// Output collection JSON path.
    #[arg(long)]
    output: PathBuf,
    /// Path to an itsweep YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Collection name.
    #[arg(long)]
    name: Option<String>,
    /// Collection description.
    #[arg(long)]
    description: Option<String>,
    /// Only export environments whose recorded response code is 200.
    #[arg(long)]
    success_only: bool,
    /// Concrete staging host URL instead of the `{{hostStaging}}` variable.
    #[arg(long)]
    host_staging: Option<String>,
    /// Concrete production host URL instead of the `{{hostProd}}` variable.
    #[arg(long)]
    host_prod: Option<String>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Rest(args) => run_rest(args),
        Command::Graphql(args) => run_graphql(args),
        Command::Rpc(args) => run_rpc(args),
        Command::Postman(args) => run_postman(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SweepConfig, String> {
    match path {
        Some(path) => SweepConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(SweepConfig::default()),
    }
}

fn run_rest(args: RestArgs) -> Result<(), String> {
    let mut config = load_config(args.report.config.as_deref())?;
    if let Some(registrar) = args.registrar {
        config.rest.registrar = registrar;
    }
    if args.include_put && !config.rest.verbs.iter().any(|verb| verb == "Put") {
        config.rest.verbs.push("Put".to_string());
    }
    config.validate().map_err(|err| err.to_string())?;

    let mode = RestMode::from_file(&args.routes, &config.rest).map_err(|err| err.to_string())?;
    run_report(&mode, &args.report, &config)
}

fn run_graphql(args: GraphQlArgs) -> Result<(), String> {
    let config = load_config(args.report.config.as_deref())?;
    let mode = GraphQlMode::from_files(&args.queries, &args.mutations, &config.graphql);
    run_report(&mode, &args.report, &config)
}

fn run_rpc(args: RpcArgs) -> Result<(), String> {
    let mut config = load_config(args.report.config.as_deref())?;
    if let Some(repository) = args.repository {
        config.rpc.repository = repository;
    }
    if config.rpc.repository.is_empty() {
        return Err(
            "rpc mode needs a repository name (--repository or rpc.repository in the config)"
                .to_string(),
        );
    }

    let mode = RpcMode::from_file(&args.proto, &config.rpc).map_err(|err| err.to_string())?;
    run_report(&mode, &args.report, &config)
}

fn run_report(mode: &dyn SweepMode, args: &ReportArgs, config: &SweepConfig) -> Result<(), String> {
    let report = run_sweep(mode, &args.fixtures, config).map_err(|err| err.to_string())?;
    print_totals(&report);

    let rendered = format_report(&report, args.format).map_err(|err| err.to_string())?;
    write_output(args.output.as_deref(), &rendered)
}

fn print_totals(report: &CoverageReport) {
    let summary = &report.summary;
    eprintln!("Got a total of {} testcases", summary.fixtures);
    if report.transport == Transport::GraphQl && summary.unmatched > 0 {
        eprintln!("{} testcase(s) are part of a chain", summary.unmatched);
    }
    eprintln!("Scanned a total of {} endpoint(s)", summary.declared);
    eprintln!(
        "Covered {} of {} endpoint(s) ({:.1}%)",
        summary.covered,
        summary.declared,
        summary.coverage * 100.0
    );
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), String> {
    let Some(path) = output else {
        print!("{content}");
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, content).map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn run_postman(args: PostmanArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    let postman = &mut config.postman;
    if let Some(name) = args.name {
        postman.name = name;
    }
    if let Some(description) = args.description {
        postman.description = description;
    }
    if args.success_only {
        postman.success_only = true;
    }
    if args.host_staging.is_some() {
        postman.host_staging = args.host_staging;
    }
    if args.host_prod.is_some() {
        postman.host_prod = args.host_prod;
    }

    let fixtures = load_fixtures(&args.fixtures).map_err(|err| err.to_string())?;
    eprintln!("Got a total of {} testcases", fixtures.len());

    let collection = build_collection(&fixtures, &config.postman);
    let raw = serde_json::to_string_pretty(&collection)
        .map_err(|err| format!("Failed to serialize collection: {err}"))?;
    write_output(Some(&args.output), &raw)?;

    let requests: usize = collection.item.iter().map(|folder| folder.item.len()).sum();
    println!(
        "Exported {requests} request(s) into '{}'.",
        args.output.display()
    );
    Ok(())
}

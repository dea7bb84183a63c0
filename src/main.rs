use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use stopgraph_core::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::{Overrides, load_config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Canonical transit stop graphs from route traces")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,
    /// Log debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Worker threads for pair evaluation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge nearby stops and rewrite route files and the chain table in place
    Canonicalize(Overrides),
    /// Build the adjacency table from the chain table and route files
    Adjacency(Overrides),
    /// Canonicalize, then build the adjacency table
    Run(Overrides),
}

#[derive(Serialize)]
struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    canonicalization: Option<CanonicalizationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_graph: Option<StopGraphReport>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<RunReport, Error> {
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::InvalidData(format!("Failed to set up thread pool: {e}")))?;
    }

    let base = load_config(cli.config.as_deref())?;
    let (overrides, canonicalize, adjacency) = match cli.cmd {
        Command::Canonicalize(overrides) => (overrides, true, false),
        Command::Adjacency(overrides) => (overrides, false, true),
        Command::Run(overrides) => (overrides, true, true),
    };
    let config = overrides.apply(base);
    let oracle = config.distance;

    let mut report = RunReport {
        canonicalization: None,
        stop_graph: None,
    };

    if canonicalize {
        let result = canonicalize_dataset(&config, &oracle)?;
        info!(
            "Canonicalized {} routes: {} merges, {} rows rewritten",
            result.routes, result.clustering.merges, result.rows_rewritten
        );
        report.canonicalization = Some(result);
    }

    if adjacency {
        let result = build_stop_graph(&config, &oracle)?;
        info!(
            "Stop graph: {} edges, {} routes skipped",
            result.adjacency.edges, result.adjacency.routes_skipped
        );
        report.stop_graph = Some(result);
    }

    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    match run(cli) {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        error!("Failed to serialize report: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

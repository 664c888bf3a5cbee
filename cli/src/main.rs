//! Chronograph CLI - render workflow histories as positioned graphs
//!
//! # Commands
//! - `chronograph graph <history> --select <id>` - print the graph around one event
//! - `chronograph walk <history> --select <id>...` - replay a sequence of selections
//!   and report which of them needed a redraw

mod graph;
mod walk;

use anyhow::{Context, Result};
use chronograph_core::{GraphConfig, History};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Chronograph CLI
#[derive(Parser)]
#[command(name = "chronograph")]
#[command(
    author,
    version,
    about = "Windowed graph layout for workflow event histories"
)]
struct Cli {
    /// Engine configuration (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the graph elements around the selected event
    Graph {
        /// History JSON file (array of events)
        history: PathBuf,

        /// Id of the selected event
        #[arg(short, long)]
        select: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run several selections through one session
    Walk {
        /// History JSON file (array of events)
        history: PathBuf,

        /// Ids to select, in order
        #[arg(short, long, required = true, num_args = 1..)]
        select: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Graph {
            history,
            select,
            output,
            pretty,
        } => graph::run_graph_command(
            load_history(&history)?,
            config,
            &select,
            output.as_deref(),
            pretty,
        ),
        Commands::Walk { history, select } => {
            walk::run_walk_command(load_history(&history)?, config, &select)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chronograph_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GraphConfig> {
    match path {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(GraphConfig::default()),
    }
}

fn load_history(path: &Path) -> Result<History> {
    let history = History::load(path)
        .with_context(|| format!("Failed to load history: {}", path.display()))?;
    tracing::info!(events = history.len(), path = %path.display(), "History loaded");
    Ok(history)
}

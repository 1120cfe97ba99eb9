//! Tyguard command-line checker
//!
//! Checks JSON documents against type expressions, using the built-in
//! types plus whatever a `tyguard.toml` declares.

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tyguard")]
#[command(about = "Check JSON documents against JSDoc-style type expressions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log definitions and bootstrap steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check documents and report every failure
    Check {
        /// Type expression, e.g. "{id:number, tags:string[]}"
        type_expr: String,
        /// JSON files to check (reads stdin when omitted)
        files: Vec<PathBuf>,
        /// Registry configuration (defaults to ./tyguard.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Treat every non-empty line as its own document
        #[arg(long)]
        lines: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Color output: auto, always, never
        #[arg(long, default_value = "auto")]
        color: String,
    },

    /// Stop at the first document that does not match
    Assert {
        /// Type expression
        type_expr: String,
        /// JSON files to check (reads stdin when omitted)
        files: Vec<PathBuf>,
        /// Registry configuration (defaults to ./tyguard.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Treat every non-empty line as its own document
        #[arg(long)]
        lines: bool,
        /// Color output: auto, always, never
        #[arg(long, default_value = "auto")]
        color: String,
    },

    /// List registered type names
    Types {
        /// Registry configuration (defaults to ./tyguard.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TYGUARD_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Report panics as one log line instead of the default stderr dump.
///
/// Panics inside predicates are caught and turned into failed results by
/// the evaluator; this only changes how they are printed.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = tyguard::evaluator::panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        tracing::error!(location = %location, "panicked: {}", message);
    }));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    install_panic_hook();

    match cli.command {
        Commands::Check {
            type_expr,
            files,
            config,
            lines,
            format,
            color,
        } => commands::check::execute(commands::check::CheckArgs {
            type_expr,
            files,
            config,
            lines,
            format,
            color,
        }),

        Commands::Assert {
            type_expr,
            files,
            config,
            lines,
            color,
        } => commands::assert::execute(commands::assert::AssertArgs {
            type_expr,
            files,
            config,
            lines,
            color,
        }),

        Commands::Types { config } => commands::types::execute(config),
    }
}

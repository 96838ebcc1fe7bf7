//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quickbase tap: extracts Quickbase metadata as a message stream
#[derive(Parser, Debug)]
#[command(name = "quickbase-tap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), read at start and rewritten at each checkpoint
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Catalog file (JSON or YAML)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format for command results
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the API
    Check,

    /// Print the catalog of available streams
    Discover,

    /// Sync the selected streams
    Sync {
        /// Streams to sync (comma-separated), overriding catalog selection
        #[arg(long)]
        streams: Option<String>,
    },

    /// List available stream names with parent and replication method
    Streams,
}

impl Commands {
    /// Subcommand name
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Check => "check",
            Commands::Discover => "discover",
            Commands::Sync { .. } => "sync",
            Commands::Streams => "streams",
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

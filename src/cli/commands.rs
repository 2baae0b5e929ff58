//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fivetran listing and lineage CLI
#[derive(Parser, Debug)]
#[command(name = "fivetran-fetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fivetran API key
    #[arg(long, global = true, env = "FIVETRAN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Fivetran API secret
    #[arg(long, global = true, env = "FIVETRAN_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List all groups in the account
    Groups,

    /// List the connectors of a group
    Connectors {
        /// Group identifier
        #[arg(short, long)]
        group: String,
    },

    /// Print table lineage for every connector of a group
    Lineage {
        /// Group identifier
        #[arg(short, long)]
        group: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One tab-separated line per entry
    Text,
    /// One JSON object per line
    Json,
}

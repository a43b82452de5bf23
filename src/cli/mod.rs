pub mod auth;
pub mod output;
pub mod system;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SourceKind;

#[derive(Parser)]
#[command(
    name = "enphase",
    version,
    about = "Enphase Home CLI - read solar system data from the Enphase v4 API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as human-readable table instead of JSON
    #[arg(short = 't', long = "table", global = true)]
    pub table: bool,

    /// Verbose output (log HTTP requests to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file with ENPHASE_* keys
    #[arg(short, long, global = true, env = "ENPHASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to read credentials from
    #[arg(short, long, global = true, value_enum, default_value_t = SourceKind::Hybrid)]
    pub source: SourceKind,

    /// Override the API host
    #[arg(long, global = true, env = "ENPHASE_BASE_URL", hide = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue or refresh OAuth tokens
    #[command(subcommand)]
    Tokens(auth::TokensCommand),

    /// Read system data
    #[command(subcommand)]
    System(system::SystemCommand),

    /// Show which credentials are configured
    Status,
}

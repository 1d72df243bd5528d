use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trend-relay")]
#[command(version)]
#[command(about = "Relay between a trading controller and its execution bots", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, env = "RELAY_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Listen port, overrides configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the relay server (default)
    Serve,
    /// Load and validate configuration, then print it
    CheckConfig,
}

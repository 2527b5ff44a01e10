mod commands;
mod discover;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rhtmx-pages")]
#[command(version, about = "Inspect compiled page routes", long_about = None)]
struct Cli {
    /// Page manifest (TOML with [routing] and [[page]] entries)
    #[arg(short, long, global = true, default_value = "pages.toml")]
    manifest: PathBuf,

    /// Also register page files found under this directory
    #[arg(long, global = true)]
    scan: Option<PathBuf>,

    /// Print debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled route table
    Routes {
        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Print the tabs visible under the given state
    Tabs {
        /// State entry `key=value` (value parsed as JSON, else kept as text)
        #[arg(short, long = "state", value_parser = parse_state_entry)]
        state: Vec<(String, Value)>,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Show what navigating to a path renders
    Resolve {
        /// Navigation target, e.g. `/blog/hello`
        path: String,

        /// State entry `key=value` (value parsed as JSON, else kept as text)
        #[arg(short, long = "state", value_parser = parse_state_entry)]
        state: Vec<(String, Value)>,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
}

/// Parses `key=value`; the value is JSON when it parses, a string otherwise
fn parse_state_entry(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;

    if key.is_empty() {
        return Err(format!("empty state key in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let loaded = discover::load(&cli.manifest, cli.scan.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Routes { json } => {
            commands::routes::execute(&loaded, json)?;
        }
        Commands::Tabs { state, json } => {
            commands::tabs::execute(&loaded, state, json).await?;
        }
        Commands::Resolve { path, state, json } => {
            commands::resolve::execute(&loaded, &path, state, json).await?;
        }
    }

    Ok(())
}

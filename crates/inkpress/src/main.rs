//! Inkpress CLI - static blog generator for block-delimited documents.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(about = "Static blog generator for block-delimited documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to inkpress.toml config file
    #[arg(short, long, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new site in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the site once
    Build {
        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build, then rebuild whenever sources or templates change
    Watch {
        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&std::env::current_dir()?, yes)?;
        }
        Commands::Build { output } => {
            commands::build::run(&cli.config, output).await?;
        }
        Commands::Watch { output } => {
            commands::watch::run(&cli.config, output).await?;
        }
    }

    Ok(())
}

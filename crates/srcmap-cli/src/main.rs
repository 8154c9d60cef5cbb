//! srcmap CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "srcmap")]
#[command(version)]
#[command(about = "Inspect Revision-Three source maps with caller chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a generated position to its original position and callers
    Lookup {
        /// Source map file
        map: PathBuf,

        /// Generated line (1-based)
        line: u32,

        /// Generated column (1-based)
        column: u32,
    },

    /// Summarize a source map
    Inspect {
        /// Source map file
        map: PathBuf,
    },

    /// List every entry of a source map
    Entries {
        /// Source map file
        map: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "srcmap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { map, line, column } => {
            commands::lookup::execute(commands::lookup::LookupArgs { map, line, column })
        }
        Commands::Inspect { map } => commands::inspect::execute(&map),
        Commands::Entries { map } => commands::entries::execute(&map),
    }
}

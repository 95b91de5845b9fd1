//! Framecast CLI — Render declarative timelines to video.
//!
//! Usage:
//!   framecast render <TIMELINE>     Render a timeline JSON file to video
//!   framecast validate <TIMELINE>   Validate a timeline and show its plan
//!   framecast check                 Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "framecast",
    about = "Declarative multi-track timeline compositing and rendering",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a timeline to video
    Render {
        /// Path to the timeline JSON file
        timeline: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render engine binary
        #[arg(long, default_value = "ffmpeg")]
        engine: PathBuf,
    },

    /// Validate a timeline and print the derived render plan
    Validate {
        /// Path to the timeline JSON file
        timeline: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    framecast_common::logging::init_logging(&framecast_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Render {
            timeline,
            output,
            engine,
        } => commands::render::run(timeline, output, engine).await,
        Commands::Validate { timeline } => commands::validate::run(timeline),
        Commands::Check => commands::check::run(),
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stash-haptics")]
#[command(author, version, about = "Haptic script downloader plugin for Stash")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand, runs as a Stash plugin reading the invocation
    /// payload from stdin.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a raw pattern file to a funscript without talking to Stash
    Convert {
        /// Raw pattern payload (JSON array of {t, v} events)
        #[arg(required = true)]
        pattern: PathBuf,

        /// Output path (defaults to the pattern path with .funscript)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Title embedded in the script metadata
        #[arg(long, default_value = "")]
        title: String,

        /// Media duration in seconds
        #[arg(long, default_value_t = 0.0)]
        duration: f64,
    },
}

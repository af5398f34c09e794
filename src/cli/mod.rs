pub mod completions;
pub mod export;
pub mod probe;

use clap::{Parser, Subcommand};

/// texport - Texture exporter for runtime asset bundles
#[derive(Parser, Debug)]
#[command(name = "texport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log pipeline decisions (same as RUST_LOG=texport=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the images of a scene file
    Export(export::ExportArgs),

    /// Report whether PNG files carry alpha
    Probe(probe::ProbeArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

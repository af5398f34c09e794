use clap::Parser;
use miette::Result;
use texport::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => texport::cli::export::run(args)?,
        Commands::Probe(args) => texport::cli::probe::run(args)?,
        Commands::Completions(args) => texport::cli::completions::run(args)?,
    }

    Ok(())
}

/// Debug events under `--verbose`, otherwise whatever `RUST_LOG` asks for.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("texport=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("texport=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

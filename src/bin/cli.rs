//! Trawl CLI - follow imports and explain inclusion decisions.

use clap::Parser;
use trawl::cli::{self, Cli, Commands};
use trawl::TrawlError;

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(&cli);

    if let Err(e) = run(&cli) {
        // Fatal engine errors carry their own wording.
        match e.downcast_ref::<TrawlError>() {
            Some(fatal) if fatal.is_fatal() => eprintln!("{}", fatal),
            _ => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Follow {
            entry,
            options,
            json,
        } => cli::follow::run(&cli.config, entry, options, *json),

        Commands::Decide {
            file,
            name,
            explicit,
            options,
        } => cli::decide::run(&cli.config, file, name.as_deref(), *explicit, options),
    }
}

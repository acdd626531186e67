//! saltctl - render and decode Salt test module calls

use anyhow::{bail, Result};
use clap::Parser;
use saltctl::cli::{Cli, Commands};
use saltctl::commands;
use saltctl::config::Config;
use saltctl::logging;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    debug!("saltctl v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List { json } => {
            println!("{}", commands::list::run(json, config.output.pretty)?);
        }
        Commands::Render {
            function,
            args,
            request,
        } => {
            println!(
                "{}",
                commands::render::run(&function, &args, &request, &config)?
            );
        }
        Commands::Decode {
            function,
            payload,
            args,
        } => {
            let out = commands::decode::run(&function, &args, &payload, config.output.pretty)?;
            println!("{}", out.rendered);
            if out.failed > 0 {
                bail!("{} of {} minions returned errors", out.failed, out.total);
            }
        }
    }

    Ok(())
}

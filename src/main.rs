use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use screen_crawler::cli::commands::{cmd_crawl, cmd_run};
use screen_crawler::cli::config::{Cli, Commands, load_config, resolve_settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Run {
            url,
            objective,
            max_cycles,
            interactive,
            script,
            report,
        } => {
            let settings =
                resolve_settings(&cli, &config, *max_cycles, *interactive, objective.as_deref());
            cmd_run(url, &settings, script.as_deref(), report.as_deref())?;
        }
        Commands::Crawl { snapshot } => {
            println!("{}", cmd_crawl(snapshot)?);
        }
    }

    Ok(())
}

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Granularity {
            context,
            start,
            end,
            since,
        } => commands::granularity::run(context.into(), start, end, since.as_deref()),
        Commands::Compile {
            domain,
            input,
            keys,
        } => commands::compile::run(domain, input.as_deref(), keys.as_deref()),
        Commands::Sql {
            domain,
            input,
            keys,
            config,
        } => commands::sql::run(domain, input.as_deref(), keys.as_deref(), config.as_deref()),
        Commands::Version => commands::version::run(),
    }
}

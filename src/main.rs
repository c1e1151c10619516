mod authors;
mod cache;
mod churn;
mod classify;
mod cli;
mod config;
mod error;
mod git;
mod hotspots;
mod lifecycle;
mod metrics;
mod patterns;
mod range;
mod report_helpers;
mod session;
#[cfg(test)]
mod test_support;
mod trends;
mod util;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use session::Session;

fn run(cli: Cli) -> error::Result<()> {
    let session = Session::open(&cli.common.repo, &cli.common.options())?;

    match cli.command {
        Commands::Metrics => metrics::run(&session),
        Commands::Churn => churn::run(&session),
        Commands::Lifecycle { files } => lifecycle::run(&session, &files),
        Commands::Patterns {
            path,
            lookback,
            cluster_window,
            cluster_min,
            convergence_limit,
        } => patterns::run(
            &session,
            &patterns::PatternsArgs {
                path,
                lookback,
                cluster_window,
                cluster_min,
                convergence_limit,
            },
        ),
        Commands::Hotspots { depth } => hotspots::run(&session, depth),
        Commands::Authors { depth } => authors::run(&session, depth),
        Commands::Trends {
            windows,
            window_days,
        } => trends::run(
            &session,
            trends::TrendsArgs {
                windows,
                window_days,
            },
        ),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

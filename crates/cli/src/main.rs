#![forbid(unsafe_code)]

use clap::Parser;
use config::Config;
use spacewarp::cli::Cli;
use spacewarp::commands;
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        _ => Config::load_default()?,
    };

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let code = commands::run(cli, config, &mut stdout, &mut stderr).await?;
    Ok(code)
}

mod cli;
mod commands;
mod output;

use anyhow::Result;
use cli::{Cli, Command};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            terraform_dir,
            subdir,
            prefix,
            labels,
            output,
        } => commands::run(cli.config, terraform_dir, subdir, prefix, labels, output).await,
        Command::Name { prefix } => commands::name(cli.config, prefix).await,
        Command::KeyId { project, key_ring, key } => commands::key_id(project, key_ring, key),
    }
}

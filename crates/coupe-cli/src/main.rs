//! # coupe — serverless stacks as data
//!
//! Compiles a declarative `coupe.yaml` into a running stack: a compose
//! service graph, a scale-to-zero Caddyfile, and provisioned JetStream
//! resources.

mod commands;
mod external;
mod fsutil;
mod prepare;
mod templates;

use clap::Parser;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli).await
}

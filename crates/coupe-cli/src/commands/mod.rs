//! CLI command definitions and dispatch.

pub mod add;
pub mod deploy;
pub mod init;
pub mod scaffold;
pub mod teardown;

use clap::{Parser, Subcommand};

/// coupe — serverless stacks as data.
#[derive(Parser, Debug)]
#[command(name = "coupe", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty stack configuration.
    Init(init::InitArgs),
    /// Add a function to the stack and scaffold its handler.
    Add(add::AddArgs),
    /// Create the stack's source layout and runtime packages.
    Scaffold(scaffold::ScaffoldArgs),
    /// Compile the stack and bring it up.
    Deploy(deploy::DeployArgs),
    /// Stop the stack and remove its build artifacts.
    Teardown(teardown::TeardownArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => init::execute(args),
        Command::Add(args) => add::execute(args),
        Command::Scaffold(args) => scaffold::execute(args),
        Command::Deploy(args) => deploy::execute(args).await,
        Command::Teardown(args) => teardown::execute(args),
    }
}

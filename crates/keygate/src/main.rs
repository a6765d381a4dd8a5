//! keygate: multi-tenant identity and server-access control service

use clap::Parser;
use color_eyre::eyre::Result;
use keygate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
    }
}

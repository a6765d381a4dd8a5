//! cli subcommands for keygate.

pub mod serve;

pub use serve::ServeCommand;

use clap::{Parser, Subcommand};

/// keygate: multi-tenant identity and server-access control service
#[derive(Parser, Debug)]
#[command(name = "keygate")]
#[command(about = "Multi-tenant identity and server-access control service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the api server
    Serve(ServeCommand),
}

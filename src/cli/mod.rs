//! CLI module for the User Manager

pub mod serve;

use clap::{Parser, Subcommand};

/// User Manager - registration service with request deduplication
#[derive(Parser)]
#[command(name = "user-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),
}

//! CLI module for the firewall audit API
//!
//! Provides subcommands for running the service:
//! - `serve`: run the HTTP API server

pub mod serve;

use clap::{Parser, Subcommand};

/// Firewall Audit API - rule normalization and cached model-backed audits
#[derive(Parser)]
#[command(name = "fwaudit-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}

//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{HistoryCommand, ListCommand, QaCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// IFRS 16 lease accounting models
#[derive(Debug, Parser, Clone)]
#[command(name = "leasebook")]
#[command(author = "Leasebook Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Lease liability, right-of-use asset and disclosure models under IFRS 16", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the lease model for one or more lease files
    Run(RunCommand),

    /// Validate a lease configuration
    Validate(ValidateCommand),

    /// Run QA checks against an exported schedule
    Qa(QaCommand),

    /// Show run history
    History(HistoryCommand),

    /// List leases with run history
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

//! Command-line interface for hexarc.
//!
//! This module provides the CLI structure and command handlers for the
//! `hexarc` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DescribeCommand, RunCommand};

/// hexarc - Deploy services the hexagonal way
///
/// Deploys the bundled sample service and inspects hexarc configuration,
/// showing how ports, models and adapters come together at runtime.
#[derive(Debug, Parser)]
#[command(name = "hexarc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the sample lamp service and serve until interrupted
    Run(RunCommand),

    /// Describe the sample service structure
    Describe(DescribeCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> hexarc::logging::Verbosity {
        if self.quiet {
            hexarc::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => hexarc::logging::Verbosity::Normal,
                1 => hexarc::logging::Verbosity::Verbose,
                _ => hexarc::logging::Verbosity::Trace,
            }
        }
    }
}

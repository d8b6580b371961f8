//! Command-line interface for rollcall.
//!
//! This module provides the CLI structure and command definitions for the
//! `rollcall` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, MethodArg, RosterCommand, ScanCommand, StatusCommand, WatchCommand,
};

/// rollcall - QR/NFC student attendance capture
///
/// Resolves scanned codes against the student roster, records attendance
/// locally, and pushes each record to a spreadsheet-backed web app endpoint
/// in the background.
#[derive(Debug, Parser)]
#[command(name = "rollcall")]
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
    /// Capture a single scanned code
    Scan(ScanCommand),

    /// Capture continuously from wedge scanner input on stdin
    Watch(WatchCommand),

    /// Show the student roster
    Roster(RosterCommand),

    /// Show counters and sync configuration
    Status(StatusCommand),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// The decoded code to capture (QR payload or NFC tag id)
    pub code: String,

    /// Which scan path the code arrived on
    #[arg(short, long, value_enum, default_value = "qr")]
    pub method: MethodArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Which scan path the session's input arrives on
    #[arg(short, long, value_enum, default_value = "qr")]
    pub method: MethodArg,

    /// Print an insight summary when the session ends
    #[arg(long)]
    pub insight: bool,

    /// Maximum records shown in the session summary
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Roster command arguments.
#[derive(Debug, Args)]
pub struct RosterCommand {
    /// Hydrate the roster from the sheet endpoint before listing
    #[arg(short, long)]
    pub sync: bool,

    /// Filter by name or class substring
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Set the sheet endpoint URL and persist it
    SetUrl {
        /// The web app URL (http or https)
        url: String,
    },

    /// Clear the sheet endpoint URL (switches to local mode)
    ClearUrl,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Scan method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// QR code scan
    Qr,
    /// NFC tag scan
    Nfc,
}

impl From<MethodArg> for crate::attendance::ScanMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Qr => Self::Qr,
            MethodArg::Nfc => Self::Nfc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::ScanMethod;

    #[test]
    fn test_method_arg_conversion() {
        assert_eq!(ScanMethod::from(MethodArg::Qr), ScanMethod::Qr);
        assert_eq!(ScanMethod::from(MethodArg::Nfc), ScanMethod::Nfc);
    }

    #[test]
    fn test_scan_command_debug() {
        let cmd = ScanCommand {
            code: "STD001".to_string(),
            method: MethodArg::Qr,
            json: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("code"));
        assert!(debug_str.contains("STD001"));
    }

    #[test]
    fn test_watch_command_debug() {
        let cmd = WatchCommand {
            method: MethodArg::Nfc,
            insight: true,
            limit: 10,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("insight"));
        assert!(debug_str.contains("limit"));
    }

    #[test]
    fn test_roster_command_debug() {
        let cmd = RosterCommand {
            sync: true,
            search: Some("XII".to_string()),
            json: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("sync"));
        assert!(debug_str.contains("XII"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::SetUrl {
            url: "https://example.com/exec".to_string(),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("SetUrl"));
    }

    #[test]
    fn test_method_arg_debug() {
        let arg = MethodArg::Nfc;
        let debug_str = format!("{arg:?}");
        assert_eq!(debug_str, "Nfc");
    }

    #[test]
    fn test_method_arg_clone() {
        let arg = MethodArg::Qr;
        let cloned = arg;
        assert_eq!(arg, cloned);
    }
}

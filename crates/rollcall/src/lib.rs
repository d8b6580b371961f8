//! `rollcall` - QR/NFC student attendance capture with spreadsheet sync
//!
//! This library provides the core functionality for resolving scanned QR and
//! NFC codes against a student roster, committing attendance records to an
//! in-memory log, and pushing each record to a spreadsheet-backed web app
//! endpoint on a fire-and-forget basis.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod attendance;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod insight;
pub mod logging;
pub mod matcher;
pub mod roster;
pub mod scanner;
pub mod stats;
pub mod store;
pub mod sync;

pub use attendance::{AttendanceRecord, Direction, ScanMethod, SyncState};
pub use capture::{CaptureFlow, CaptureOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use insight::InsightClient;
pub use logging::init_logging;
pub use matcher::MatchPolicy;
pub use roster::Student;
pub use stats::AttendanceStats;
pub use store::{Store, StoreEvent};
pub use sync::SheetClient;

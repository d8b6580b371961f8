//! Attendance record types for rollcall.
//!
//! This module defines the fundamental data structures for representing one
//! capture event: the scan method that produced it, the direction tag, the
//! local-only sync state, and the record itself.

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::Student;

/// The scan path that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanMethod {
    /// Optical scan of a printed or displayed QR code.
    Qr,
    /// Proximity-tag serial read.
    Nfc,
}

impl std::fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qr => write!(f, "QR"),
            Self::Nfc => write!(f, "NFC"),
        }
    }
}

/// Direction tag for a record.
///
/// Capture always produces [`Direction::In`]; `Out` is modeled for the wire
/// contract but never emitted by the capture flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Arrival.
    In,
    /// Departure.
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

/// Outcome of the fire-and-forget push for one record.
///
/// Local bookkeeping only; the sheet endpoint never sees this field.
/// `Synced` means the request was dispatched without a transport error,
/// not that delivery was acknowledged (the write is response-blind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Not dispatched yet, or never dispatched (local mode).
    #[default]
    Pending,
    /// Dispatched without a transport error.
    Synced,
    /// Dispatch raised a transport error.
    Failed,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Synced => write!(f, "synced"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One committed capture event.
///
/// Student fields are a denormalized snapshot taken at capture time; later
/// roster edits do not retroactively update past records. Field names
/// serialize in the camelCase form the sheet endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Locally generated unique identifier.
    pub id: String,

    /// Identifier of the matched student at capture time.
    pub student_id: String,

    /// Name of the matched student at capture time.
    pub student_name: String,

    /// Class of the matched student at capture time.
    pub class_name: String,

    /// Capture time on the local clock, display form only.
    pub timestamp: String,

    /// Direction tag; capture always produces `IN`.
    #[serde(rename = "type")]
    pub direction: Direction,

    /// Which scan path produced this record.
    pub method: ScanMethod,

    /// Push outcome, kept off the wire.
    #[serde(skip)]
    pub sync_state: SyncState,
}

impl AttendanceRecord {
    /// Create a record for a matched student.
    ///
    /// Assigns a fresh UUID v4 (pairwise collision probability around
    /// 2^-122, negligible at attendance volumes), snapshots the student's
    /// display fields, stamps the local wall-clock time, and starts in
    /// [`SyncState::Pending`].
    #[must_use]
    pub fn for_student(student: &Student, method: ScanMethod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            class_name: student.class_name.clone(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            direction: Direction::In,
            method,
            sync_state: SyncState::Pending,
        }
    }
}

//! Dashboard counters derived from the roster and the attendance log.

use std::collections::HashSet;

use serde::Serialize;

use crate::attendance::AttendanceRecord;
use crate::roster::Student;
use crate::store::Store;

/// Attendance counters for the current session.
///
/// `present` counts distinct students in the log regardless of how many
/// records they produced. Lateness is not tracked, so `late` is always
/// zero and `absent` is simply the rest of the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    /// Number of students on the roster.
    pub total_students: usize,
    /// Distinct students with at least one record.
    pub present: usize,
    /// Always zero.
    pub late: usize,
    /// Roster students with no record, floored at zero.
    pub absent: usize,
}

impl AttendanceStats {
    /// Compute counters from a roster and log snapshot.
    #[must_use]
    pub fn compute(roster: &[Student], log: &[AttendanceRecord]) -> Self {
        let present = log
            .iter()
            .map(|record| record.student_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_students: roster.len(),
            present,
            late: 0,
            absent: roster.len().saturating_sub(present),
        }
    }

    /// Compute counters from the store's current state.
    #[must_use]
    pub fn from_store(store: &Store) -> Self {
        Self::compute(&store.roster(), &store.log())
    }
}

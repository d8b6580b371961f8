//! In-memory state store for rollcall.
//!
//! This module owns the roster and the attendance log for the lifetime of
//! the running session. All mutation goes through the store's methods and
//! is atomic under an interior lock; readers receive cloned snapshots.
//! Registered subscribers are notified after each mutation commits.
//!
//! Nothing here is durable: the sheet endpoint is the system of record and
//! the only configuration that survives a restart lives in the config file.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::attendance::{AttendanceRecord, SyncState};
use crate::roster::{self, Student};

/// A change notification delivered to store subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The roster was replaced by hydration; carries the new size.
    RosterReplaced(usize),
    /// A record was committed to the attendance log.
    RecordAppended(AttendanceRecord),
    /// A record's push outcome was recorded.
    SyncStateChanged {
        /// Identifier of the affected record.
        record_id: String,
        /// The new sync state.
        state: SyncState,
    },
}

#[derive(Debug, Default)]
struct State {
    roster: Vec<Student>,
    /// Newest record at the front.
    log: VecDeque<AttendanceRecord>,
}

/// Shared state store for the roster and the attendance log.
///
/// Cheap to share as `Arc<Store>`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct Store {
    state: Mutex<State>,
    subscribers: Mutex<Vec<UnboundedSender<StoreEvent>>>,
}

impl Store {
    /// Create a store with an empty roster and log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the built-in seed roster.
    #[must_use]
    pub fn with_seed() -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.roster = roster::seed_roster();
        }
        store
    }

    /// Get a snapshot of the current roster, in roster order.
    #[must_use]
    pub fn roster(&self) -> Vec<Student> {
        self.state
            .lock()
            .map(|s| s.roster.clone())
            .unwrap_or_default()
    }

    /// Number of students currently enrolled.
    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.state.lock().map(|s| s.roster.len()).unwrap_or(0)
    }

    /// Replace the entire roster with a hydrated candidate.
    ///
    /// An empty candidate is a silent no-op so a failed remote fetch never
    /// discards a known-good roster. Returns whether the candidate was
    /// applied.
    pub fn replace_roster(&self, candidate: Vec<Student>) -> bool {
        if candidate.is_empty() {
            debug!("Ignoring empty roster candidate");
            return false;
        }

        let count = candidate.len();
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        state.roster = candidate;
        drop(state);

        debug!(students = count, "Roster replaced");
        self.notify(StoreEvent::RosterReplaced(count));
        true
    }

    /// Enroll one student at the end of the roster.
    pub fn add_student(&self, student: Student) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        debug!(student_id = %student.id, name = %student.name, "Student added");
        state.roster.push(student);
    }

    /// Remove a student by id.
    ///
    /// Administrative operation only; already-committed records keep their
    /// denormalized snapshot of the student. Returns `true` if a student
    /// was removed.
    pub fn remove_student(&self, id: &str) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let before = state.roster.len();
        state.roster.retain(|s| s.id != id);
        let removed = state.roster.len() < before;
        if removed {
            debug!(student_id = id, "Student removed");
        }
        removed
    }

    /// Filter the roster by a case-insensitive substring of name or class.
    #[must_use]
    pub fn search_roster(&self, term: &str) -> Vec<Student> {
        self.state
            .lock()
            .map(|s| roster::search(&s.roster, term))
            .unwrap_or_default()
    }

    /// Commit one record to the attendance log.
    ///
    /// Prepends in O(1); existing entries are never removed or reordered.
    pub fn append_attendance(&self, record: AttendanceRecord) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.log.push_front(record.clone());
        drop(state);

        debug!(
            record_id = %record.id,
            student = %record.student_name,
            method = %record.method,
            "Attendance recorded"
        );
        self.notify(StoreEvent::RecordAppended(record));
    }

    /// Get a snapshot of the attendance log, newest first.
    #[must_use]
    pub fn log(&self) -> Vec<AttendanceRecord> {
        self.state
            .lock()
            .map(|s| s.log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of committed records.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.state.lock().map(|s| s.log.len()).unwrap_or(0)
    }

    /// Get the newest `limit` records, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<AttendanceRecord> {
        self.state
            .lock()
            .map(|s| s.log.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Record a push outcome for one committed record.
    ///
    /// An unknown id is a no-op: the log never forgets records, but a
    /// dispatch can outlive the invocation that created it. Returns whether
    /// a record was updated.
    pub fn mark_sync(&self, record_id: &str, sync_state: SyncState) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let Some(record) = state.log.iter_mut().find(|r| r.id == record_id) else {
            drop(state);
            debug!(record_id, "Sync state update for unknown record");
            return false;
        };
        record.sync_state = sync_state;
        drop(state);

        self.notify(StoreEvent::SyncStateChanged {
            record_id: record_id.to_string(),
            state: sync_state,
        });
        true
    }

    /// Register a subscriber for change notifications.
    ///
    /// Events are delivered in commit order. Dropping the receiver
    /// unregisters the subscriber on the next notification.
    pub fn subscribe(&self) -> UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn notify(&self, event: StoreEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::ScanMethod;

    fn record_for(store: &Store, index: usize) -> AttendanceRecord {
        AttendanceRecord::for_student(&store.roster()[index], ScanMethod::Qr)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = Store::new();
        assert!(store.roster().is_empty());
        assert!(store.log().is_empty());
        assert_eq!(store.log_len(), 0);
    }

    #[test]
    fn test_with_seed() {
        let store = Store::with_seed();
        assert_eq!(store.roster_len(), 3);
        assert_eq!(store.roster()[0].name, "Ahmad Fauzi");
    }

    #[test]
    fn test_append_is_monotonic_newest_first() {
        let store = Store::with_seed();

        let first = record_for(&store, 0);
        store.append_attendance(first.clone());
        assert_eq!(store.log_len(), 1);

        let second = record_for(&store, 1);
        store.append_attendance(second.clone());
        assert_eq!(store.log_len(), 2);

        let log = store.log();
        assert_eq!(log[0].id, second.id);
        assert_eq!(log[1].id, first.id);
    }

    #[test]
    fn test_append_never_deduplicates() {
        let store = Store::with_seed();
        store.append_attendance(record_for(&store, 0));
        store.append_attendance(record_for(&store, 0));

        let log = store.log();
        assert_eq!(log.len(), 2);
        assert_ne!(log[0].id, log[1].id);
        assert_eq!(log[0].student_id, log[1].student_id);
    }

    #[test]
    fn test_replace_roster_empty_is_noop() {
        let store = Store::with_seed();
        assert!(!store.replace_roster(Vec::new()));
        assert_eq!(store.roster_len(), 3);
    }

    #[test]
    fn test_replace_roster_applies_non_empty() {
        let store = Store::with_seed();
        let candidate = vec![Student::new("10", "Dewi Lestari", "XI-IPA-3", "STD010")];

        assert!(store.replace_roster(candidate));
        assert_eq!(store.roster_len(), 1);
        assert_eq!(store.roster()[0].id, "10");
    }

    #[test]
    fn test_add_student() {
        let store = Store::with_seed();
        store.add_student(Student::new("4", "Rina Kartika", "XII-IPA-1", "STD004"));
        assert_eq!(store.roster_len(), 4);
        assert_eq!(store.roster()[3].id, "4");
    }

    #[test]
    fn test_remove_student() {
        let store = Store::with_seed();
        assert!(store.remove_student("2"));
        assert_eq!(store.roster_len(), 2);
        assert!(store.roster().iter().all(|s| s.id != "2"));
    }

    #[test]
    fn test_remove_student_unknown_id() {
        let store = Store::with_seed();
        assert!(!store.remove_student("999"));
        assert_eq!(store.roster_len(), 3);
    }

    #[test]
    fn test_remove_student_keeps_existing_records() {
        let store = Store::with_seed();
        store.append_attendance(record_for(&store, 1));

        store.remove_student("2");
        let log = store.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].student_name, "Siti Aminah");
    }

    #[test]
    fn test_search_roster() {
        let store = Store::with_seed();
        let hits = store.search_roster("ips");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Budi Santoso");
    }

    #[test]
    fn test_recent_limits_and_orders() {
        let store = Store::with_seed();
        for _ in 0..5 {
            store.append_attendance(record_for(&store, 0));
        }

        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, store.log()[0].id);

        assert_eq!(store.recent(100).len(), 5);
    }

    #[test]
    fn test_mark_sync_updates_record() {
        let store = Store::with_seed();
        let record = record_for(&store, 0);
        store.append_attendance(record.clone());

        assert!(store.mark_sync(&record.id, SyncState::Synced));
        assert_eq!(store.log()[0].sync_state, SyncState::Synced);
    }

    #[test]
    fn test_mark_sync_unknown_id_is_noop() {
        let store = Store::with_seed();
        store.append_attendance(record_for(&store, 0));

        assert!(!store.mark_sync("no-such-record", SyncState::Failed));
        assert_eq!(store.log()[0].sync_state, SyncState::Pending);
    }

    #[test]
    fn test_subscriber_sees_events_in_commit_order() {
        let store = Store::with_seed();
        let mut events = store.subscribe();

        let record = record_for(&store, 0);
        store.append_attendance(record.clone());
        store.mark_sync(&record.id, SyncState::Synced);

        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::RecordAppended(record.clone())
        );
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::SyncStateChanged {
                record_id: record.id,
                state: SyncState::Synced,
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_subscriber_sees_roster_replacement() {
        let store = Store::with_seed();
        let mut events = store.subscribe();

        store.replace_roster(vec![Student::new("7", "Eka Putri", "X-1", "STD007")]);
        assert_eq!(events.try_recv().unwrap(), StoreEvent::RosterReplaced(1));

        // The rejected empty candidate must not produce an event.
        store.replace_roster(Vec::new());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let store = Store::with_seed();
        let events = store.subscribe();
        drop(events);

        let mut live = store.subscribe();
        store.append_attendance(record_for(&store, 0));

        assert!(matches!(
            live.try_recv().unwrap(),
            StoreEvent::RecordAppended(_)
        ));
    }
}

//! Capture flow for rollcall.
//!
//! One scan-to-record transaction: match the code against the roster,
//! synthesize the record, commit it to the store, and fire the remote push
//! without waiting on it.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::attendance::{AttendanceRecord, ScanMethod, SyncState};
use crate::matcher::{self, MatchPolicy};
use crate::store::Store;
use crate::sync::SheetClient;

/// Result of one capture invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The code matched; the record is committed to the log.
    ///
    /// Carries the record as committed. The push outcome lands in the
    /// store asynchronously, so the embedded `sync_state` is the state at
    /// commit time.
    Recorded(AttendanceRecord),

    /// The code matched no roster entry; nothing was committed.
    NotRegistered {
        /// The rejected code.
        code: String,
        /// The scan path that produced it.
        method: ScanMethod,
    },
}

impl CaptureOutcome {
    /// Check whether this outcome committed a record.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Orchestrates scan-to-record transactions.
///
/// The commit is synchronous: a [`CaptureOutcome::Recorded`] means the
/// record is already visible to every log reader and subscriber. The
/// remote push runs on a spawned task and reports back through the
/// store's sync state; its outcome never alters the committed record's
/// identity fields and is never retried.
#[derive(Debug)]
pub struct CaptureFlow {
    store: Arc<Store>,
    sync: Arc<SheetClient>,
    policy: MatchPolicy,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl CaptureFlow {
    /// Create a flow over the given store and sync client.
    #[must_use]
    pub fn new(store: Arc<Store>, sync: Arc<SheetClient>, policy: MatchPolicy) -> Self {
        Self {
            store,
            sync,
            policy,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// The match policy this flow resolves codes under.
    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Process one scan event.
    ///
    /// On a match the record is committed before this returns; the push is
    /// dispatched on a spawned task. In local mode no task is spawned and
    /// the record stays [`SyncState::Pending`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while an endpoint is
    /// configured, since the push dispatch needs an executor to spawn on.
    pub fn capture(&self, code: &str, method: ScanMethod) -> CaptureOutcome {
        let roster = self.store.roster();
        let Some(student) = matcher::match_code(&roster, code, method, self.policy) else {
            info!(code, %method, "Scan did not match any student");
            return CaptureOutcome::NotRegistered {
                code: code.to_string(),
                method,
            };
        };

        let record = AttendanceRecord::for_student(student, method);
        self.store.append_attendance(record.clone());
        info!(
            student = %record.student_name,
            class = %record.class_name,
            %method,
            "Attendance captured"
        );

        if self.sync.is_configured() {
            self.dispatch_push(record.clone());
        } else {
            debug!(record_id = %record.id, "Local mode, record stays pending");
        }

        CaptureOutcome::Recorded(record)
    }

    /// Spawn the fire-and-forget push for one committed record.
    fn dispatch_push(&self, record: AttendanceRecord) {
        let store = Arc::clone(&self.store);
        let sync = Arc::clone(&self.sync);

        let handle = tokio::spawn(async move {
            let dispatched = sync.push_attendance(&record).await;
            let state = if dispatched {
                SyncState::Synced
            } else {
                SyncState::Failed
            };
            store.mark_sync(&record.id, state);
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Await every in-flight push dispatch.
    ///
    /// The flow never retries pushes; this exists so a short-lived
    /// invocation does not exit before its dispatch completes. Long
    /// sessions can call it at shutdown to settle the log's sync states.
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        };

        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "Sync dispatch task failed");
            }
        }
    }
}

//! Remote sync adapter for the spreadsheet endpoint.
//!
//! This module is the boundary to the sheet-backed store: one configurable
//! web-app URL, a read action for the roster and a write action for
//! attendance records. The adapter is deliberately lenient; every failure
//! mode degrades to "no data" or "not dispatched" and is logged rather
//! than surfaced, so a dead endpoint leaves the tool fully usable as a
//! local-only attendance log.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attendance::AttendanceRecord;
use crate::config::SyncConfig;
use crate::roster::Student;
use crate::store::Store;

/// Action discriminator for roster reads.
const ACTION_GET_STUDENTS: &str = "getStudents";

/// Action discriminator for attendance writes.
const ACTION_ADD_ATTENDANCE: &str = "addAttendance";

/// Wire envelope for attendance writes.
#[derive(Debug, Serialize)]
struct PushEnvelope<'a> {
    action: &'a str,
    data: &'a AttendanceRecord,
}

/// HTTP client for the spreadsheet-backed store.
///
/// Constructed from an explicit endpoint value; `None` selects local mode,
/// where both operations are no-ops returning an empty or `false` result
/// without touching the network. No timeout is configured on requests: a
/// hung endpoint never resolves, and callers must not depend on either
/// operation completing within any bound.
#[derive(Debug, Clone)]
pub struct SheetClient {
    endpoint: Option<String>,
    http: Client,
}

impl SheetClient {
    /// Create a client for the given endpoint, or a local-mode client.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            http: Client::new(),
        }
    }

    /// Build a client from the sync section of the configuration.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.endpoint_url.clone())
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// The configured endpoint, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Fetch the roster from the sheet.
    ///
    /// Returns an empty vector in local mode and on any transport error,
    /// non-success status, or undecodable body. "No students" and "fetch
    /// failed" are indistinguishable to callers by contract; the store's
    /// no-op-on-empty replace rule is what keeps a known-good roster alive.
    pub async fn fetch_roster(&self) -> Vec<Student> {
        let Some(base) = &self.endpoint else {
            debug!("No sheet endpoint configured, skipping roster fetch");
            return Vec::new();
        };
        let url = format!("{base}?action={ACTION_GET_STUDENTS}");

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Roster fetch failed");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "Roster fetch returned an error status");
            return Vec::new();
        }

        match response.json::<Value>().await {
            Ok(body) => decode_roster(&body),
            Err(err) => {
                warn!(error = %err, "Roster response was not valid JSON");
                Vec::new()
            }
        }
    }

    /// Push one attendance record to the sheet.
    ///
    /// Write-only semantics: the response status and body are ignored, so
    /// `true` means "dispatched without a transport error", not "delivery
    /// acknowledged". A transport error is the only `false` path besides
    /// local mode, which returns `false` without issuing a request.
    pub async fn push_attendance(&self, record: &AttendanceRecord) -> bool {
        let Some(base) = &self.endpoint else {
            debug!("No sheet endpoint configured, skipping attendance push");
            return false;
        };
        let envelope = PushEnvelope {
            action: ACTION_ADD_ATTENDANCE,
            data: record,
        };

        match self.http.post(base).json(&envelope).send().await {
            Ok(response) => {
                debug!(
                    record_id = %record.id,
                    status = %response.status(),
                    "Attendance record dispatched"
                );
                true
            }
            Err(err) => {
                warn!(record_id = %record.id, error = %err, "Attendance push failed");
                false
            }
        }
    }
}

/// Hydrate the store's roster from the sheet.
///
/// Applies the fetched roster through the store's no-op-on-empty replace
/// rule, so failures and empty sheets leave the current roster standing.
/// Returns the number of students applied (0 covers local mode, fetch
/// failure, and an empty sheet alike).
pub async fn hydrate_roster(store: &Store, client: &SheetClient) -> usize {
    let fetched = client.fetch_roster().await;
    let count = fetched.len();
    if store.replace_roster(fetched) {
        debug!(students = count, "Roster hydrated from sheet");
        count
    } else {
        0
    }
}

/// Decode a roster response leniently.
///
/// The body must be a JSON array; anything else decodes to no students.
/// Entries are validated individually and malformed ones are skipped
/// rather than failing the whole response.
#[must_use]
pub fn decode_roster(body: &Value) -> Vec<Student> {
    let Some(entries) = body.as_array() else {
        warn!("Roster response was not a JSON array");
        return Vec::new();
    };

    let students: Vec<Student> = entries.iter().filter_map(student_from_value).collect();
    if students.len() < entries.len() {
        warn!(
            dropped = entries.len() - students.len(),
            "Dropped malformed roster entries"
        );
    }
    students
}

/// Validate and coerce one wire entry into a student.
///
/// `id` and `name` must coerce to non-empty strings or the entry is
/// rejected. `className` and `qrCode` default to empty strings; empty
/// `nfcId`/`photo` cells become absent. The sheet returns numeric-looking
/// cells as JSON numbers, so scalars coerce to their string form.
fn student_from_value(value: &Value) -> Option<Student> {
    let id = optional_field(value, "id")?;
    let name = optional_field(value, "name")?;

    Some(Student {
        id,
        name,
        class_name: optional_field(value, "className").unwrap_or_default(),
        qr_code: optional_field(value, "qrCode").unwrap_or_default(),
        nfc_id: optional_field(value, "nfcId"),
        photo: optional_field(value, "photo"),
    })
}

/// Read a field as a non-empty scalar string, coercing numbers.
fn optional_field(entry: &Value, key: &str) -> Option<String> {
    let coerced = match entry.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    coerced.filter(|s| !s.is_empty())
}

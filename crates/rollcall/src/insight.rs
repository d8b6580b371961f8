//! Attendance insight client.
//!
//! Renders recent attendance records into a plain-text digest and posts it
//! to a configurable language-model endpoint for a short trend summary. The
//! endpoint is optional and best-effort: with no endpoint, or on any
//! failure, callers get a static fallback string instead of an error.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::attendance::AttendanceRecord;
use crate::config::InsightConfig;

/// Returned when there are no records to analyze.
const NO_DATA_TEXT: &str = "Not enough attendance data to analyze yet.";

/// Returned when the endpoint is unset or the request fails.
const FALLBACK_TEXT: &str = "Attendance insight is unavailable right now.";

/// Render records as one digest line each, newest first.
///
/// Line shape: `{name} ({class}) - {direction} at {time}`.
#[must_use]
pub fn summarize(records: &[AttendanceRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "{} ({}) - {} at {}",
                record.student_name, record.class_name, record.direction, record.timestamp
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Client for the optional insight endpoint.
#[derive(Debug, Clone)]
pub struct InsightClient {
    endpoint: Option<String>,
    http: Client,
}

impl InsightClient {
    /// Create a client for the given endpoint, or an inert one for `None`.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            http: Client::new(),
        }
    }

    /// Create a client from the insight section of the configuration.
    #[must_use]
    pub fn from_config(config: &InsightConfig) -> Self {
        Self::new(config.endpoint_url.clone())
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Summarize the given records through the insight endpoint.
    ///
    /// Always resolves to displayable text: the endpoint's trimmed response
    /// on success, a static no-data string for an empty log (no request is
    /// made), and a static fallback on an unset endpoint, transport error,
    /// error status, or empty response body.
    pub async fn insight(&self, records: &[AttendanceRecord]) -> String {
        if records.is_empty() {
            return NO_DATA_TEXT.to_string();
        }

        let Some(endpoint) = &self.endpoint else {
            debug!("no insight endpoint configured, using fallback text");
            return FALLBACK_TEXT.to_string();
        };

        let digest = summarize(records);
        debug!(endpoint = %endpoint, records = records.len(), "requesting insight");

        let response = match self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(digest)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "insight request failed");
                return FALLBACK_TEXT.to_string();
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "insight endpoint returned an error");
            return FALLBACK_TEXT.to_string();
        }

        match response.text().await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    FALLBACK_TEXT.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to read insight response");
                FALLBACK_TEXT.to_string()
            }
        }
    }
}

//! Scan input sources.
//!
//! This module defines the input boundary for capture: a `ScanSource`
//! produces decoded scan events over a channel until it is stopped or its
//! input ends. The production source reads keyboard-wedge scanner lines
//! from stdin; hardware decoding happens in the scanner itself, so a
//! source only ever sees the decoded code string.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::attendance::ScanMethod;
use crate::error::Result;

/// A decoded scan, tagged with the path it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// The decoded identifier payload.
    pub code: String,
    /// Which scan path produced it.
    pub method: ScanMethod,
}

impl ScanEvent {
    /// Create a new scan event.
    #[must_use]
    pub fn new(code: impl Into<String>, method: ScanMethod) -> Self {
        Self {
            code: code.into(),
            method,
        }
    }
}

/// Trait for scan input sources.
///
/// Implementors provide the actual mechanism for receiving scans (a wedge
/// scanner on stdin, a serial NFC reader) and send decoded events through
/// the provided channel.
#[async_trait]
pub trait ScanSource: Send + Sync {
    /// The name of this scan source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// The scan path this source's events are tagged with.
    fn method(&self) -> ScanMethod;

    /// Run the source, sending events through the channel.
    ///
    /// Runs until the input ends, the receiver is dropped, or `stop` is
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to start, such as when the
    /// underlying device is unavailable.
    async fn start(&mut self, tx: mpsc::Sender<ScanEvent>) -> Result<()>;

    /// Request the source to stop.
    fn stop(&mut self);

    /// Check if the source is currently running.
    fn is_running(&self) -> bool;
}

/// A scan source reading keyboard-wedge scanner input line by line.
///
/// Wedge scanners type the decoded code followed by Enter, so one line is
/// one scan. Only the line terminator is stripped; the remaining bytes,
/// whitespace included, are the code. Empty lines are skipped. The whole
/// session runs on a single scan path; the source tags every event with
/// it.
#[derive(Debug)]
pub struct WedgeSource<R> {
    reader: R,
    method: ScanMethod,
    running: Arc<AtomicBool>,
}

impl WedgeSource<BufReader<Stdin>> {
    /// Create a wedge source reading from stdin.
    #[must_use]
    pub fn stdin(method: ScanMethod) -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()), method)
    }
}

impl<R> WedgeSource<R>
where
    R: AsyncBufRead + Unpin + Send + Sync,
{
    /// Create a wedge source over any buffered line reader.
    #[must_use]
    pub fn from_reader(reader: R, method: ScanMethod) -> Self {
        Self {
            reader,
            method,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle that can stop this source from another task.
    #[must_use]
    pub fn stop_handle(&self) -> ScanHandle {
        ScanHandle {
            running: Arc::clone(&self.running),
        }
    }
}

#[async_trait]
impl<R> ScanSource for WedgeSource<R>
where
    R: AsyncBufRead + Unpin + Send + Sync,
{
    fn name(&self) -> &'static str {
        "wedge"
    }

    fn method(&self) -> ScanMethod {
        self.method
    }

    async fn start(&mut self, tx: mpsc::Sender<ScanEvent>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("wedge source already running");
            return Ok(());
        }

        debug!(method = %self.method, "starting wedge scan source");

        let mut line = String::new();
        loop {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            line.clear();
            match self.reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("wedge input ended");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "error reading wedge input");
                    break;
                }
            }

            // A stop requested mid-read drops the pending line.
            if !self.running.load(Ordering::SeqCst) {
                debug!("stop requested, discarding pending input");
                break;
            }

            // The terminator is transport framing; everything before it is
            // code bytes and goes through untouched.
            let code = match line.strip_suffix('\n') {
                Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
                None => line.as_str(),
            };
            if code.is_empty() {
                trace!("skipping empty wedge line");
                continue;
            }

            if tx.send(ScanEvent::new(code, self.method)).await.is_err() {
                debug!("scan channel closed, stopping source");
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("wedge scan source stopped");
        Ok(())
    }

    fn stop(&mut self) {
        debug!("stopping wedge scan source");
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// A handle to control a running scan source.
///
/// This can be cloned and sent to other tasks to stop the source remotely.
#[derive(Debug, Clone)]
pub struct ScanHandle {
    running: Arc<AtomicBool>,
}

impl ScanHandle {
    /// Request the associated source to stop.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the source is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

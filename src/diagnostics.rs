//! Diagnostics sink for per-source events and non-fatal conditions.
//!
//! The codec and the tree transformer never log on their own. Everything they
//! want to report (a payload materialized, an empty decode result, a remote
//! source that was skipped) goes through an injected
//! [`Arc<dyn DiagnosticsSink>`] set via
//! [`crate::config::TranscodeConfigBuilder::diagnostics`]. The default sink,
//! [`TracingDiagnostics`], forwards to `tracing`.
//!
//! # Example
//!
//! ```rust
//! use ignition_coder::{Diagnostic, DiagnosticsSink, TranscodeConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct WarningCounter {
//!     warnings: AtomicUsize,
//! }
//!
//! impl DiagnosticsSink for WarningCounter {
//!     fn on_diagnostic(&self, diagnostic: &Diagnostic) {
//!         self.warnings.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("warning: {diagnostic}");
//!     }
//! }
//!
//! let counter = Arc::new(WarningCounter { warnings: AtomicUsize::new(0) });
//! let config = TranscodeConfig::builder()
//!     .diagnostics(counter as Arc<dyn DiagnosticsSink>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Direction;
use crate::error::Diagnostic;
use crate::output::TransformStats;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Receives events from a decode or encode run.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` payload jobs
/// run concurrently and `on_source_complete` / `on_diagnostic` may be called
/// from several tasks. All methods default to no-ops.
pub trait DiagnosticsSink: Send + Sync {
    /// Called once, after planning, before any file is touched.
    ///
    /// # Arguments
    /// * `direction`     — decode or encode
    /// * `total_sources` — number of sources that will be transcoded
    fn on_transform_start(&self, direction: Direction, total_sources: usize) {
        let _ = (direction, total_sources);
    }

    /// Called when one source has been materialized (decode) or embedded (encode).
    ///
    /// # Arguments
    /// * `entry_path` — the entry's `path` field as written in the document
    /// * `target`     — the on-disk file that was written or read
    /// * `bytes`      — payload size in bytes
    fn on_source_complete(&self, entry_path: &str, target: &Path, bytes: usize) {
        let _ = (entry_path, target, bytes);
    }

    /// Called for every non-fatal condition.
    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        let _ = diagnostic;
    }

    /// Called once after the tree has been rewritten.
    fn on_transform_complete(&self, stats: &TransformStats) {
        let _ = stats;
    }
}

/// Discards every event.
pub struct NoopDiagnostics;

impl DiagnosticsSink for NoopDiagnostics {}

/// Forwards diagnostics to `tracing` as warnings and progress as debug events.
///
/// This is the default sink.
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn on_transform_start(&self, direction: Direction, total_sources: usize) {
        debug!("{direction}: {total_sources} source(s) to transcode");
    }

    fn on_source_complete(&self, entry_path: &str, target: &Path, bytes: usize) {
        debug!("{entry_path} ⇄ {} ({bytes} bytes)", target.display());
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        warn!("{diagnostic}");
    }
}

/// Records every diagnostic and optionally forwards all events to another sink.
///
/// The run functions wrap the configured sink in one of these so the final
/// [`crate::output::TranscodeReport`] can list the warnings.
pub struct CollectingDiagnostics {
    inner: Option<Arc<dyn DiagnosticsSink>>,
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self {
            inner: None,
            collected: Mutex::new(Vec::new()),
        }
    }

    pub fn forwarding(inner: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            inner: Some(inner),
            collected: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the diagnostics seen so far, in arrival order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for CollectingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSink for CollectingDiagnostics {
    fn on_transform_start(&self, direction: Direction, total_sources: usize) {
        if let Some(inner) = &self.inner {
            inner.on_transform_start(direction, total_sources);
        }
    }

    fn on_source_complete(&self, entry_path: &str, target: &Path, bytes: usize) {
        if let Some(inner) = &self.inner {
            inner.on_source_complete(entry_path, target, bytes);
        }
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
        if let Some(inner) = &self.inner {
            inner.on_diagnostic(diagnostic);
        }
    }

    fn on_transform_complete(&self, stats: &TransformStats) {
        if let Some(inner) = &self.inner {
            inner.on_transform_complete(stats);
        }
    }
}

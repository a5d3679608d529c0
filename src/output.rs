//! Result types returned by decode and encode runs.

use crate::config::Direction;
use crate::error::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Counters produced by one pass of the tree transformer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    /// Number of entries in `storage.files`.
    pub total_entries: usize,
    /// Entries with a non-empty path and at least one source.
    pub eligible_entries: usize,
    /// Sources materialized (decode) or embedded (encode).
    pub transcoded_sources: usize,
    /// Sources on eligible entries that were left unchanged
    /// (inline text, remote URLs, already in the target form).
    pub untouched_sources: usize,
    /// Total payload bytes written (decode) or read (encode).
    pub payload_bytes: u64,
}

/// Summary of a complete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeReport {
    pub direction: Direction,
    /// The document that was read.
    pub input_document: PathBuf,
    /// The document that was written.
    pub output_document: PathBuf,
    /// Directory payload files were written to or read from.
    pub files_dir: PathBuf,
    pub stats: TransformStats,
    /// Non-fatal conditions seen during the run, in arrival order.
    pub diagnostics: Vec<Diagnostic>,
    pub duration_ms: u64,
}

//! Error types for the ignition-coder library.
//!
//! Two distinct types reflect two distinct outcomes:
//!
//! * [`TranscodeError`] — **Fatal**: the run cannot continue (missing input,
//!   malformed data URI, expected payload file absent). Returned as
//!   `Err(TranscodeError)` from the top-level `decode*` / `encode*` functions
//!   and aborts the run on first occurrence.
//!
//! * [`Diagnostic`] — **Non-fatal**: something worth telling the user about
//!   (an empty payload, a remote source that cannot be extracted) that does
//!   not stop the transformation. Delivered to the configured
//!   [`crate::diagnostics::DiagnosticsSink`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ignition-coder library.
#[derive(Debug, Error)]
pub enum TranscodeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The document text is not a valid JSON object.
    #[error("Failed to parse document '{path}': {detail}")]
    ParseError { path: PathBuf, detail: String },

    /// The document has no `storage.files` list, so there is nothing to extract.
    #[error("No transformation needed: '{path}' has no storage.files entries")]
    NoTransformationNeeded { path: PathBuf },

    /// Encode input directory did not contain exactly one document file.
    #[error("Expected exactly one .{extension} file in '{dir}', found {found}")]
    AmbiguousSource {
        dir: PathBuf,
        extension: String,
        found: usize,
    },

    // ── Data URI errors ───────────────────────────────────────────────────
    /// Source string does not start with `data:`.
    #[error("Not a data URI (expected 'data:' prefix): '{uri}'")]
    InvalidScheme { uri: String },

    /// Data URI has no `,` between metadata and payload.
    #[error("Malformed data URI, missing ',' separator: '{uri}'")]
    MalformedUri { uri: String },

    /// Payload of a `;base64` data URI could not be decoded.
    #[error("Invalid base64 payload for '{path}': {detail}")]
    InvalidBase64 { path: PathBuf, detail: String },

    // ── File errors ───────────────────────────────────────────────────────
    /// Entry path would resolve outside the target directory.
    #[error("Refusing unsafe entry path '{entry_path}': it must stay inside the target directory")]
    UnsafePath { entry_path: String },

    /// Entry would be extracted over the decoded document, or next to it as a
    /// second document the encoder could not tell apart.
    #[error("Entry '{entry_path}' would be extracted to '{target}', which is reserved for the decoded document")]
    ReservedTarget { entry_path: String, target: PathBuf },

    /// A placeholder source points at a file that cannot be read.
    #[error("Failed to read materialized file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal condition noticed during a run.
///
/// Delivered through [`crate::diagnostics::DiagnosticsSink::on_diagnostic`]
/// and collected into [`crate::output::TranscodeReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A `;base64` payload decoded to zero bytes; an empty file was written.
    #[error("Decoded content for '{path}' is empty; wrote an empty file")]
    EmptyPayload { path: PathBuf },

    /// A source uses a scheme other than `data:` and was left as-is.
    #[error("Skipping non-data source for '{entry_path}': {source_prefix}")]
    NonDataSource {
        entry_path: String,
        source_prefix: String,
    },

    /// An entry carries both `contents` and `append` sources.
    #[error("'{entry_path}' has both contents and append sources; append left untouched")]
    ContentsShadowsAppend { entry_path: String },

    /// Two sources map to the same on-disk path.
    #[error("More than one source maps to '{path}'")]
    DuplicateTarget { path: PathBuf },

    /// `ignition.version` is outside the recognised set.
    #[error("Unrecognised Ignition version '{version}'; storage.files layout may differ")]
    UnrecognizedVersion { version: String },

    /// The document has no `ignition.version` field.
    #[error("Document has no ignition.version field")]
    MissingVersion,
}

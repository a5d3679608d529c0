//! Configuration types for decoding and encoding Ignition documents.
//!
//! All run behaviour is controlled through [`TranscodeConfig`], built via its
//! [`TranscodeConfigBuilder`]. The defaults reproduce the classic layout:
//! one `decoded.ign` next to the extracted files, pretty-printed JSON, and
//! strictly sequential file I/O.

use crate::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use crate::error::TranscodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// File extension of Ignition documents.
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "ign";

/// File name of the rewritten document written by a decode pass.
pub const DEFAULT_DECODED_FILE_NAME: &str = "decoded.ign";

/// Configuration for a decode or encode run.
///
/// # Example
/// ```rust
/// use ignition_coder::{OutputStyle, TranscodeConfig};
///
/// let config = TranscodeConfig::builder()
///     .concurrency(4)
///     .output_style(OutputStyle::Compact)
///     .strip_defaults(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 4);
/// ```
#[derive(Clone)]
pub struct TranscodeConfig {
    /// Maximum number of payload files read or written at once. Default: 1.
    ///
    /// Results are always consumed in document order, so the first failing
    /// entry is the one reported regardless of this value.
    pub concurrency: usize,

    /// How the output document is serialised. Default: [`OutputStyle::Pretty`].
    pub output_style: OutputStyle,

    /// Drop null, empty, `false` and `0` values before writing the encoded
    /// document. Default: false.
    pub strip_defaults: bool,

    /// Extension used to discover the document in an encode input directory.
    /// Default: `ign`.
    pub document_extension: String,

    /// File name of the rewritten document in a decode output directory.
    /// Must carry `document_extension`, or a later encode of that directory
    /// cannot find it. Default: `decoded.<document_extension>`.
    pub decoded_file_name: String,

    /// Receiver for progress events and non-fatal diagnostics.
    /// Default: [`TracingDiagnostics`].
    pub diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            output_style: OutputStyle::default(),
            strip_defaults: false,
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
            decoded_file_name: DEFAULT_DECODED_FILE_NAME.to_string(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }
}

impl fmt::Debug for TranscodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeConfig")
            .field("concurrency", &self.concurrency)
            .field("output_style", &self.output_style)
            .field("strip_defaults", &self.strip_defaults)
            .field("document_extension", &self.document_extension)
            .field("decoded_file_name", &self.decoded_file_name)
            .field("diagnostics", &"<dyn DiagnosticsSink>")
            .finish()
    }
}

impl TranscodeConfig {
    /// Create a new builder for `TranscodeConfig`.
    pub fn builder() -> TranscodeConfigBuilder {
        TranscodeConfigBuilder {
            config: Self::default(),
            decoded_name_set: false,
        }
    }
}

/// Builder for [`TranscodeConfig`].
#[derive(Debug)]
pub struct TranscodeConfigBuilder {
    config: TranscodeConfig,
    decoded_name_set: bool,
}

impl TranscodeConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.config.output_style = style;
        self
    }

    pub fn strip_defaults(mut self, v: bool) -> Self {
        self.config.strip_defaults = v;
        self
    }

    /// Accepts the extension with or without a leading dot.
    pub fn document_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.config.document_extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn decoded_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.decoded_file_name = name.into();
        self.decoded_name_set = true;
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.config.diagnostics = sink;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Without an explicit decoded file name, the name follows the document
    /// extension (`decoded.<ext>`).
    pub fn build(mut self) -> Result<TranscodeConfig, TranscodeError> {
        if !self.decoded_name_set {
            self.config.decoded_file_name = format!("decoded.{}", self.config.document_extension);
        }
        let c = &self.config;
        if c.document_extension.is_empty() {
            return Err(TranscodeError::InvalidConfig(
                "Document extension must not be empty".into(),
            ));
        }
        let name = c.decoded_file_name.as_str();
        if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
            return Err(TranscodeError::InvalidConfig(format!(
                "Decoded file name must be a plain file name, got '{name}'"
            )));
        }
        let ext = std::path::Path::new(name).extension().and_then(|e| e.to_str());
        if ext != Some(c.document_extension.as_str()) {
            return Err(TranscodeError::InvalidConfig(format!(
                "Decoded file name '{name}' must end in .{}, or encode will not find it",
                c.document_extension
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which way a run transforms the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Packed → expanded: extract `;base64` payloads to files.
    Decode,
    /// Expanded → packed: embed placeholder files back as `;base64` sources.
    Encode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Decode => f.write_str("decode"),
            Direction::Encode => f.write_str("encode"),
        }
    }
}

/// JSON layout of the written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputStyle {
    /// Two-space indented JSON. (default)
    #[default]
    Pretty,
    /// Single-line JSON.
    Compact,
}

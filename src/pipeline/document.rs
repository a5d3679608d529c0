//! Loading, discovering and writing Ignition documents.
//!
//! The document is kept as an untyped [`serde_json::Value`] tree rather than a
//! versioned schema struct: the transformer only needs `storage.files`, and
//! every other field (including ones from Ignition config versions newer than
//! this crate) must survive a decode/encode cycle untouched. `serde_json` is
//! built with `preserve_order`, so object keys also keep their original order.

use crate::config::OutputStyle;
use crate::error::{Diagnostic, TranscodeError};
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ignition config versions whose `storage.files` layout this crate knows.
pub const SUPPORTED_VERSIONS: &[&str] = &["3.0.0", "3.1.0", "3.2.0", "3.3.0", "3.4.0", "3.5.0"];

/// A parsed Ignition document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse document text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, TranscodeError> {
        let root: Value = serde_json::from_str(text).map_err(|e| TranscodeError::ParseError {
            path: origin.to_path_buf(),
            detail: e.to_string(),
        })?;

        if !root.is_object() {
            return Err(TranscodeError::ParseError {
                path: origin.to_path_buf(),
                detail: "top-level value must be a JSON object".into(),
            });
        }

        Ok(Self { root })
    }

    /// Read and parse the document at `path`.
    pub async fn load(path: &Path) -> Result<Self, TranscodeError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TranscodeError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => TranscodeError::FileReadError {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        debug!("Loaded document: {} ({} bytes)", path.display(), text.len());
        Self::parse(&text, path)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// True when `storage.files` exists and is an array.
    pub fn has_file_list(&self) -> bool {
        self.files().is_some()
    }

    pub fn files(&self) -> Option<&Vec<Value>> {
        self.root.pointer("/storage/files").and_then(Value::as_array)
    }

    pub fn files_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root
            .pointer_mut("/storage/files")
            .and_then(Value::as_array_mut)
    }

    /// `ignition.version`, if present.
    pub fn version(&self) -> Option<&str> {
        self.root.pointer("/ignition/version").and_then(Value::as_str)
    }

    /// A warning when the version is missing or outside [`SUPPORTED_VERSIONS`].
    ///
    /// Versions are never rejected; an unknown version only means the
    /// `storage.files` layout is not guaranteed.
    pub fn version_diagnostic(&self) -> Option<Diagnostic> {
        match self.version() {
            None => Some(Diagnostic::MissingVersion),
            Some(v) if SUPPORTED_VERSIONS.contains(&v) => None,
            Some(v) => Some(Diagnostic::UnrecognizedVersion {
                version: v.to_string(),
            }),
        }
    }

    /// Remove default-valued fields; see [`strip_default_values`].
    pub fn strip_defaults(&mut self) {
        strip_default_values(&mut self.root);
    }

    /// Serialise to text.
    pub fn to_text(&self, style: OutputStyle) -> Result<String, TranscodeError> {
        let text = match style {
            OutputStyle::Pretty => serde_json::to_string_pretty(&self.root),
            OutputStyle::Compact => serde_json::to_string(&self.root),
        };
        text.map_err(|e| TranscodeError::Internal(format!("Failed to serialise document: {e}")))
    }

    /// Write the document to `path`, replacing any existing file.
    ///
    /// Uses atomic write (temp file in the same directory + persist) so a
    /// reader never sees a half-written document. The temp file is removed
    /// when writing or persisting fails.
    pub async fn save(&self, path: &Path, style: OutputStyle) -> Result<(), TranscodeError> {
        let text = self.to_text(style)?;
        let write_err = |source| TranscodeError::FileWriteError {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(write_err)?;

        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        // On failure the returned file is dropped, which deletes it.
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Find the single regular file in `dir` whose extension is `extension`.
///
/// # Errors
/// * [`TranscodeError::InputNotFound`] — `dir` does not exist
/// * [`TranscodeError::AmbiguousSource`] — zero or several candidates
pub async fn discover(dir: &Path, extension: &str) -> Result<PathBuf, TranscodeError> {
    let read_err = |e: std::io::Error| match e.kind() {
        ErrorKind::NotFound => TranscodeError::InputNotFound {
            path: dir.to_path_buf(),
        },
        _ => TranscodeError::FileReadError {
            path: dir.to_path_buf(),
            source: e,
        },
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(extension) {
            continue;
        }
        // metadata() follows symlinks, so a linked document still counts
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => candidates.push(path),
            _ => {}
        }
    }

    candidates.sort();
    debug!(
        "Found {} .{} candidate(s) in {}",
        candidates.len(),
        extension,
        dir.display()
    );

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        found => Err(TranscodeError::AmbiguousSource {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            found,
        }),
    }
}

/// Recursively drop null, `""`, `[]`, `{}`, `false` and integer `0` values
/// from objects and arrays. Containers emptied by the pass are dropped too.
pub fn strip_default_values(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for v in map.values_mut() {
                strip_default_values(v);
            }
            map.retain(|_, v| !is_default(v));
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                strip_default_values(v);
            }
            items.retain(|v| !is_default(v));
        }
        _ => {}
    }
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_u64() == Some(0) || n.as_i64() == Some(0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

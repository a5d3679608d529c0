//! # ignition-coder
//!
//! Decode and encode Fedora CoreOS Ignition configs.
//!
//! Ignition documents embed file contents as data URIs
//! (`data:text/plain;base64,SGVsbG8=`), which makes them hard to review and
//! edit. This crate unpacks every `;base64` payload of `storage.files` into a
//! real file on disk and replaces the source with a placeholder
//! (`data:text/plain;base64-placeholder,`); the reverse pass reads the files
//! back and re-embeds them. Every other field of the document is left exactly
//! as it was.
//!
//! ## Pipeline Overview
//!
//! ```text
//! decode:  config.ign ─▶ load ─▶ transform ─▶ <out>/decoded.ign
//!                                   │
//!                                   └─▶ <out>/etc/motd, <out>/a/0, …
//!
//! encode:  <dir>/*.ign ─▶ load ─▶ transform ─▶ packed.ign
//!                                   ▲
//!                                   └── <dir>/etc/motd, <dir>/a/0, …
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ignition_coder::{decode, encode, TranscodeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranscodeConfig::default();
//!     let report = decode("config.ign", "unpacked", &config).await?;
//!     eprintln!("extracted {} file(s)", report.stats.transcoded_sources);
//!
//!     // … edit unpacked/etc/motd …
//!
//!     encode("config.packed.ign", "unpacked", &config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## On-disk layout
//!
//! | Source                           | File                          |
//! |----------------------------------|-------------------------------|
//! | `storage.files[*].contents`      | `<out>/<path>`                |
//! | `storage.files[*].append[i]`     | `<out>/<path>/<i>`            |
//! | the rewritten document           | `<out>/decoded.ign`           |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ignition-coder` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Direction, OutputStyle, TranscodeConfig, TranscodeConfigBuilder};
pub use convert::{decode, decode_sync, encode, encode_sync};
pub use diagnostics::{CollectingDiagnostics, DiagnosticsSink, NoopDiagnostics, TracingDiagnostics};
pub use error::{Diagnostic, TranscodeError};
pub use output::{TranscodeReport, TransformStats};
pub use pipeline::codec::{DataUri, Encoding, Transcoded};
pub use pipeline::document::Document;
pub use pipeline::transform::{transform, EntrySources};

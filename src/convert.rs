//! Whole-run entry points: load, transform, write.
//!
//! [`decode`] turns a packed document into `decoded.ign` plus one file per
//! `;base64` payload. [`encode`] finds the single document in a directory and
//! packs the placeholder files back in. Both abort on the first error; the
//! rewritten document is written last, and atomically, so it only exists when
//! every payload was handled.

use crate::config::{Direction, TranscodeConfig};
use crate::diagnostics::{CollectingDiagnostics, DiagnosticsSink};
use crate::error::TranscodeError;
use crate::output::TranscodeReport;
use crate::pipeline::document::{self, Document};
use crate::pipeline::transform::transform;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract every `;base64` payload of `input` into `output_dir`.
///
/// Writes `<output_dir>/<config.decoded_file_name>` with each extracted
/// source replaced by `data:<mediatype>;base64-placeholder,`.
///
/// # Errors
/// - [`TranscodeError::InputNotFound`] / [`TranscodeError::ParseError`] for a bad input
/// - [`TranscodeError::NoTransformationNeeded`] when there is no `storage.files`
///   list (nothing is written)
/// - any codec or file error from the transform
pub async fn decode(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &TranscodeConfig,
) -> Result<TranscodeReport, TranscodeError> {
    let start = Instant::now();
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    info!("Decoding {} into {}", input.display(), output_dir.display());

    let collector = Arc::new(CollectingDiagnostics::forwarding(Arc::clone(
        &config.diagnostics,
    )));
    let run_config = with_sink(config, collector.clone());

    let mut document = Document::load(input).await?;
    if !document.has_file_list() {
        return Err(TranscodeError::NoTransformationNeeded {
            path: input.to_path_buf(),
        });
    }
    if let Some(diagnostic) = document.version_diagnostic() {
        collector.on_diagnostic(&diagnostic);
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| TranscodeError::FileWriteError {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let stats = transform(&mut document, output_dir, Direction::Decode, &run_config).await?;

    let output_document = output_dir.join(&config.decoded_file_name);
    document.save(&output_document, config.output_style).await?;
    debug!("Wrote {}", output_document.display());

    info!(
        "Decoding complete: extracted {} file(s) to {}",
        stats.transcoded_sources,
        output_dir.display()
    );

    Ok(TranscodeReport {
        direction: Direction::Decode,
        input_document: input.to_path_buf(),
        output_document,
        files_dir: output_dir.to_path_buf(),
        stats,
        diagnostics: collector.diagnostics(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Pack the files in `input_dir` back into the single document found there.
///
/// The document is the only file in `input_dir` with extension
/// `config.document_extension`. The result is written to `output_file`.
///
/// # Errors
/// - [`TranscodeError::AmbiguousSource`] when zero or several documents are
///   found (nothing is written)
/// - [`TranscodeError::FileReadError`] when a placeholder's file is missing
pub async fn encode(
    output_file: impl AsRef<Path>,
    input_dir: impl AsRef<Path>,
    config: &TranscodeConfig,
) -> Result<TranscodeReport, TranscodeError> {
    let start = Instant::now();
    let output_file = output_file.as_ref();
    let input_dir = input_dir.as_ref();
    info!("Encoding {} into {}", input_dir.display(), output_file.display());

    let collector = Arc::new(CollectingDiagnostics::forwarding(Arc::clone(
        &config.diagnostics,
    )));
    let run_config = with_sink(config, collector.clone());

    let input_document = document::discover(input_dir, &config.document_extension).await?;
    debug!("Using document {}", input_document.display());

    let mut document = Document::load(&input_document).await?;
    if let Some(diagnostic) = document.version_diagnostic() {
        collector.on_diagnostic(&diagnostic);
    }

    let stats = transform(&mut document, input_dir, Direction::Encode, &run_config).await?;

    if config.strip_defaults {
        document.strip_defaults();
    }
    document.save(output_file, config.output_style).await?;

    info!(
        "Encoding complete: embedded {} file(s) into {}",
        stats.transcoded_sources,
        output_file.display()
    );

    Ok(TranscodeReport {
        direction: Direction::Encode,
        input_document,
        output_document: output_file.to_path_buf(),
        files_dir: input_dir.to_path_buf(),
        stats,
        diagnostics: collector.diagnostics(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Synchronous wrapper around [`decode`].
///
/// Creates a temporary tokio runtime internally.
pub fn decode_sync(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &TranscodeConfig,
) -> Result<TranscodeReport, TranscodeError> {
    runtime()?.block_on(decode(input, output_dir, config))
}

/// Synchronous wrapper around [`encode`].
///
/// Creates a temporary tokio runtime internally.
pub fn encode_sync(
    output_file: impl AsRef<Path>,
    input_dir: impl AsRef<Path>,
    config: &TranscodeConfig,
) -> Result<TranscodeReport, TranscodeError> {
    runtime()?.block_on(encode(output_file, input_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn runtime() -> Result<tokio::runtime::Runtime, TranscodeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranscodeError::Internal(format!("Failed to create tokio runtime: {e}")))
}

fn with_sink(config: &TranscodeConfig, sink: Arc<dyn DiagnosticsSink>) -> TranscodeConfig {
    let mut run_config = config.clone();
    run_config.diagnostics = sink;
    run_config
}

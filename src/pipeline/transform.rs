//! Tree transformer: rewrites the sources of `storage.files` in place.
//!
//! A run has three phases:
//!
//! 1. **plan** — walk `storage.files`, classify each entry, and collect one
//!    [`Job`] per source whose encoding matches the direction. Pure, apart
//!    from diagnostics.
//! 2. **execute** — run every job through the codec. Jobs are polled through
//!    an ordered, bounded stream, so with `concurrency > 1` files are written
//!    in parallel but results (and the first error) still arrive in document
//!    order. A plan with duplicate targets runs one job at a time, so the last
//!    source in document order is the one left on disk.
//! 3. **apply** — splice the rewritten sources back into the tree. This only
//!    happens once every job has succeeded, so the in-memory document is
//!    either fully transformed or untouched.
//!
//! Entry order and `append` order are never changed; only `source` strings of
//! transformed nodes are replaced.

use crate::config::{Direction, TranscodeConfig};
use crate::diagnostics::DiagnosticsSink;
use crate::error::{Diagnostic, TranscodeError};
use crate::output::TransformStats;
use crate::pipeline::codec::{self, DataUri, Encoding, DATA_SCHEME};
use crate::pipeline::document::Document;
use crate::pipeline::materialize;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which sources of an eligible file entry are transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySources {
    /// Only `contents.source` is set.
    Contents,
    /// Only `append` carries sources; holds the indices of those elements.
    Append(Vec<usize>),
    /// Both are set. `contents` wins; `append` is left untouched because the
    /// entry path cannot be both the contents file and the append directory.
    ContentsShadowingAppend,
}

impl EntrySources {
    /// Classify a `storage.files` element. `None` means the entry is not
    /// eligible: its `path` is empty or it has no string `source` anywhere.
    pub fn classify(entry: &Value) -> Option<Self> {
        let path = entry.get("path").and_then(Value::as_str).unwrap_or("");
        if path.is_empty() {
            return None;
        }

        let has_contents = source_of(entry.get("contents")).is_some();
        let append: Vec<usize> = entry
            .get("append")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| source_of(Some(item)).is_some())
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();

        match (has_contents, append.is_empty()) {
            (true, true) => Some(EntrySources::Contents),
            (true, false) => Some(EntrySources::ContentsShadowingAppend),
            (false, false) => Some(EntrySources::Append(append)),
            (false, true) => None,
        }
    }
}

fn source_of(node: Option<&Value>) -> Option<&str> {
    node?.get("source")?.as_str()
}

/// Location of one rewritable `source` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Contents { entry: usize },
    Append { entry: usize, index: usize },
}

#[derive(Debug)]
struct Job {
    slot: Slot,
    entry_path: String,
    target: PathBuf,
    source: String,
}

/// Transform every eligible entry of `document` in `direction`.
///
/// `root` is the directory payload files are written to (decode) or read from
/// (encode). A document without `storage.files` is left as-is.
///
/// # Errors
/// Unsafe or reserved targets ([`TranscodeError::UnsafePath`],
/// [`TranscodeError::ReservedTarget`]) are rejected before anything is
/// written. Otherwise the first failing source in document order aborts the
/// run and leaves `document` unchanged. Files already written by earlier
/// sources stay on disk.
pub async fn transform(
    document: &mut Document,
    root: &Path,
    direction: Direction,
    config: &TranscodeConfig,
) -> Result<TransformStats, TranscodeError> {
    let sink = Arc::clone(&config.diagnostics);
    let mut stats = TransformStats::default();

    let planned = match document.files() {
        Some(files) => plan(files, root, direction, config, &mut stats)?,
        None => Plan::default(),
    };
    let concurrency = if planned.has_duplicates {
        debug!("Duplicate targets planned; running sources sequentially");
        1
    } else {
        config.concurrency.max(1)
    };
    let jobs = planned.jobs;
    sink.on_transform_start(direction, jobs.len());

    let results: Vec<(Slot, String, usize)> = stream::iter(jobs.into_iter().map(|job| {
        let sink = Arc::clone(&sink);
        async move {
            let out = codec::transcode(&job.target, &job.source, direction, sink.as_ref()).await?;
            sink.on_source_complete(&job.entry_path, &job.target, out.bytes);
            let rewritten = out.rewritten_source(direction).ok_or_else(|| {
                TranscodeError::Internal(format!(
                    "planned source for '{}' produced no rewrite",
                    job.entry_path
                ))
            })?;
            Ok::<_, TranscodeError>((job.slot, rewritten, out.bytes))
        }
    }))
    .buffered(concurrency)
    .try_collect()
    .await?;

    if !results.is_empty() {
        let files = document.files_mut().ok_or_else(|| {
            TranscodeError::Internal("storage.files disappeared during transform".into())
        })?;
        for (slot, rewritten, bytes) in results {
            let node = source_slot_mut(files, slot).ok_or_else(|| {
                TranscodeError::Internal(format!("no source node at {slot:?}"))
            })?;
            *node = Value::String(rewritten);
            stats.transcoded_sources += 1;
            stats.payload_bytes += bytes as u64;
        }
    }

    sink.on_transform_complete(&stats);
    Ok(stats)
}

#[derive(Debug, Default)]
struct Plan {
    jobs: Vec<Job>,
    has_duplicates: bool,
}

fn plan(
    files: &[Value],
    root: &Path,
    direction: Direction,
    config: &TranscodeConfig,
    stats: &mut TransformStats,
) -> Result<Plan, TranscodeError> {
    let sink: &dyn DiagnosticsSink = config.diagnostics.as_ref();
    let wanted = match direction {
        Direction::Decode => Encoding::Base64,
        Direction::Encode => Encoding::Base64Placeholder,
    };

    stats.total_entries = files.len();
    let mut jobs = Vec::new();
    let mut targets = HashSet::new();
    let mut has_duplicates = false;

    for (entry_idx, entry) in files.iter().enumerate() {
        let Some(kind) = EntrySources::classify(entry) else {
            continue;
        };
        stats.eligible_entries += 1;
        // classify() guarantees a non-empty string path
        let entry_path = entry.get("path").and_then(Value::as_str).unwrap_or_default();

        let mut candidates: Vec<(Slot, &str)> = Vec::new();
        match &kind {
            EntrySources::Contents | EntrySources::ContentsShadowingAppend => {
                if let Some(source) = source_of(entry.get("contents")) {
                    candidates.push((Slot::Contents { entry: entry_idx }, source));
                }
                if kind == EntrySources::ContentsShadowingAppend {
                    sink.on_diagnostic(&Diagnostic::ContentsShadowsAppend {
                        entry_path: entry_path.to_string(),
                    });
                    stats.untouched_sources += append_source_count(entry);
                }
            }
            EntrySources::Append(indices) => {
                for &index in indices {
                    let item = entry.get("append").and_then(|a| a.get(index));
                    if let Some(source) = source_of(item) {
                        candidates.push((
                            Slot::Append {
                                entry: entry_idx,
                                index,
                            },
                            source,
                        ));
                    }
                }
            }
        }

        for (slot, source) in candidates {
            if !source.starts_with(DATA_SCHEME) {
                sink.on_diagnostic(&Diagnostic::NonDataSource {
                    entry_path: entry_path.to_string(),
                    source_prefix: scheme_of(source),
                });
                stats.untouched_sources += 1;
                continue;
            }
            if DataUri::parse(source)?.encoding != wanted {
                stats.untouched_sources += 1;
                continue;
            }

            let target = match slot {
                Slot::Contents { .. } => materialize::contents_target(root, entry_path)?,
                Slot::Append { index, .. } => materialize::append_target(root, entry_path, index)?,
            };
            if direction == Direction::Decode
                && materialize::is_reserved(
                    root,
                    &target,
                    &config.decoded_file_name,
                    &config.document_extension,
                )
            {
                return Err(TranscodeError::ReservedTarget {
                    entry_path: entry_path.to_string(),
                    target,
                });
            }
            if !targets.insert(target.clone()) {
                has_duplicates = true;
                sink.on_diagnostic(&Diagnostic::DuplicateTarget {
                    path: target.clone(),
                });
            }

            jobs.push(Job {
                slot,
                entry_path: entry_path.to_string(),
                target,
                source: source.to_string(),
            });
        }
    }

    Ok(Plan {
        jobs,
        has_duplicates,
    })
}

fn append_source_count(entry: &Value) -> usize {
    entry
        .get("append")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|i| source_of(Some(i)).is_some()).count())
        .unwrap_or(0)
}

fn source_slot_mut(files: &mut [Value], slot: Slot) -> Option<&mut Value> {
    match slot {
        Slot::Contents { entry } => files.get_mut(entry)?.pointer_mut("/contents/source"),
        Slot::Append { entry, index } => files
            .get_mut(entry)?
            .get_mut("append")?
            .get_mut(index)?
            .get_mut("source"),
    }
}

// `https://host/…` → `https:`; never echoes a whole payload into a warning.
fn scheme_of(source: &str) -> String {
    match source.find(':') {
        Some(i) if i < 32 => source[..=i].to_string(),
        _ => "<no scheme>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingDiagnostics, NoopDiagnostics};
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(v: Value) -> Document {
        Document::parse(&v.to_string(), Path::new("test.ign")).unwrap()
    }

    fn quiet() -> TranscodeConfig {
        TranscodeConfig::builder()
            .diagnostics(Arc::new(NoopDiagnostics))
            .build()
            .unwrap()
    }

    fn collecting() -> (TranscodeConfig, Arc<CollectingDiagnostics>) {
        let sink = Arc::new(CollectingDiagnostics::new());
        let config = TranscodeConfig::builder()
            .diagnostics(sink.clone())
            .build()
            .unwrap();
        (config, sink)
    }

    #[test]
    fn classify_entries() {
        assert_eq!(
            EntrySources::classify(&json!({"path": "/a", "contents": {"source": "data:,x"}})),
            Some(EntrySources::Contents)
        );
        assert_eq!(
            EntrySources::classify(&json!({"path": "/a", "append": [{}, {"source": "data:,x"}]})),
            Some(EntrySources::Append(vec![1]))
        );
        assert_eq!(
            EntrySources::classify(&json!({
                "path": "/a",
                "contents": {"source": "data:,x"},
                "append": [{"source": "data:,y"}]
            })),
            Some(EntrySources::ContentsShadowingAppend)
        );
        assert_eq!(
            EntrySources::classify(&json!({"path": "", "contents": {"source": "data:,x"}})),
            None
        );
        assert_eq!(
            EntrySources::classify(&json!({"path": "/a", "contents": {"verification": {}}})),
            None
        );
        assert_eq!(
            EntrySources::classify(&json!({"path": "/a", "contents": {"source": null}})),
            None
        );
    }

    #[tokio::test]
    async fn base64_contents_are_materialized() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/etc/motd", "mode": 420,
                  "contents": { "source": "data:text/plain;base64,SGVsbG8=",
                                "verification": { "hash": "sha512-abc" } } }
            ] }
        }));

        let stats = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        assert_eq!(std::fs::read(tmp.path().join("etc/motd")).unwrap(), b"Hello");
        assert_eq!(
            d.as_value(),
            &json!({
                "storage": { "files": [
                    { "path": "/etc/motd", "mode": 420,
                      "contents": { "source": "data:text/plain;base64-placeholder,",
                                    "verification": { "hash": "sha512-abc" } } }
                ] }
            })
        );
        assert_eq!(stats.transcoded_sources, 1);
        assert_eq!(stats.payload_bytes, 5);
    }

    #[tokio::test]
    async fn inline_text_source_is_left_alone() {
        let tmp = TempDir::new().unwrap();
        let original = json!({
            "storage": { "files": [
                { "path": "/etc/hostname", "contents": { "source": "data:,my-host" } }
            ] }
        });
        let mut d = doc(original.clone());

        let stats = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        assert_eq!(d.as_value(), &original);
        assert_eq!(stats.untouched_sources, 1);
        assert!(!tmp.path().join("etc/hostname").exists());
    }

    #[tokio::test]
    async fn append_sources_get_indexed_paths() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/a", "append": [ { "source": "data:;base64,QQ==" }, {} ] }
            ] }
        }));

        transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        assert_eq!(std::fs::read(tmp.path().join("a/0")).unwrap(), b"A");
        assert!(!tmp.path().join("a/1").exists());
        assert_eq!(
            d.as_value()["storage"]["files"][0]["append"],
            json!([
                { "source": "data:text/plain;charset=US-ASCII;base64-placeholder," },
                {}
            ])
        );
    }

    #[tokio::test]
    async fn ineligible_entries_pass_through_in_place() {
        let tmp = TempDir::new().unwrap();
        let original = json!({
            "storage": { "files": [
                { "path": "", "contents": { "source": "data:;base64,QQ==" } },
                { "path": "/b", "contents": { "source": "data:;base64,Qg==" } },
                { "path": "/c", "mode": 493 },
                { "path": "/d", "append": [ {} ] }
            ] }
        });
        let mut d = doc(original.clone());

        let stats = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        let files = d.files().unwrap();
        assert_eq!(files[0], original["storage"]["files"][0]);
        assert_eq!(
            files[1]["contents"]["source"],
            "data:text/plain;charset=US-ASCII;base64-placeholder,"
        );
        assert_eq!(files[2], original["storage"]["files"][2]);
        assert_eq!(files[3], original["storage"]["files"][3]);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.eligible_entries, 1);
    }

    #[tokio::test]
    async fn both_contents_and_append_prefers_contents() {
        let tmp = TempDir::new().unwrap();
        let (config, sink) = collecting();
        let mut d = doc(json!({
            "ignition": { "version": "3.4.0" },
            "storage": { "files": [
                { "path": "/x",
                  "contents": { "source": "data:;base64,QQ==" },
                  "append": [ { "source": "data:;base64,Qg==" } ] }
            ] }
        }));

        let stats = transform(&mut d, tmp.path(), Direction::Decode, &config)
            .await
            .unwrap();

        assert!(tmp.path().join("x").is_file());
        assert_eq!(
            d.as_value()["storage"]["files"][0]["append"][0]["source"],
            "data:;base64,Qg=="
        );
        assert_eq!(stats.untouched_sources, 1);
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::ContentsShadowsAppend {
                entry_path: "/x".into()
            }]
        );
    }

    #[tokio::test]
    async fn remote_sources_are_skipped_with_warning() {
        let tmp = TempDir::new().unwrap();
        let (config, sink) = collecting();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/opt/tool", "contents": { "source": "https://example.com/tool" } }
            ] }
        }));

        transform(&mut d, tmp.path(), Direction::Decode, &config)
            .await
            .unwrap();

        assert_eq!(
            d.as_value()["storage"]["files"][0]["contents"]["source"],
            "https://example.com/tool"
        );
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::NonDataSource {
                entry_path: "/opt/tool".into(),
                source_prefix: "https:".into()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_data_uri_aborts() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/a", "contents": { "source": "data:text/plain;base64" } }
            ] }
        }));
        let err = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::MalformedUri { .. }));
    }

    #[tokio::test]
    async fn encode_embeds_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a/0"), "A").unwrap();
        std::fs::create_dir_all(tmp.path().join("etc")).unwrap();
        std::fs::write(tmp.path().join("etc/motd"), "Hello").unwrap();

        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/etc/motd", "contents": { "source": "data:text/plain;base64-placeholder," } },
                { "path": "/a", "append": [ { "source": "data:;base64-placeholder," }, {} ] }
            ] }
        }));

        let stats = transform(&mut d, tmp.path(), Direction::Encode, &quiet())
            .await
            .unwrap();

        assert_eq!(
            d.as_value(),
            &json!({
                "storage": { "files": [
                    { "path": "/etc/motd", "contents": { "source": "data:text/plain;base64,SGVsbG8=" } },
                    { "path": "/a", "append": [
                        { "source": "data:text/plain;charset=US-ASCII;base64,QQ==" }, {}
                    ] }
                ] }
            })
        );
        assert_eq!(stats.transcoded_sources, 2);
    }

    #[tokio::test]
    async fn failed_encode_leaves_document_untouched() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("present"), "ok").unwrap();
        let original = json!({
            "storage": { "files": [
                { "path": "/present", "contents": { "source": "data:;base64-placeholder," } },
                { "path": "/missing", "contents": { "source": "data:;base64-placeholder," } }
            ] }
        });
        let mut d = doc(original.clone());

        let err = transform(&mut d, tmp.path(), Direction::Encode, &quiet())
            .await
            .unwrap_err();

        match err {
            TranscodeError::FileReadError { path, .. } => {
                assert_eq!(path, tmp.path().join("missing"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(d.as_value(), &original);
    }

    #[tokio::test]
    async fn unsafe_entry_path_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/../escape", "contents": { "source": "data:;base64,QQ==" } }
            ] }
        }));
        let err = transform(&mut d, &tmp.path().join("out"), Direction::Decode, &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::UnsafePath { .. }));
        assert!(!tmp.path().join("escape").exists());
    }

    #[tokio::test]
    async fn duplicate_targets_are_reported() {
        let tmp = TempDir::new().unwrap();
        let (config, sink) = collecting();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/dup", "contents": { "source": "data:;base64,QQ==" } },
                { "path": "dup", "contents": { "source": "data:;base64,QQ==" } }
            ] }
        }));

        transform(&mut d, tmp.path(), Direction::Decode, &config)
            .await
            .unwrap();

        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::DuplicateTarget {
                path: tmp.path().join("dup")
            }]
        );
    }

    #[tokio::test]
    async fn duplicate_targets_keep_last_source_under_concurrency() {
        let tmp = TempDir::new().unwrap();
        let mut entries: Vec<Value> = (0..8)
            .map(|i| json!({ "path": format!("/f/{i}"), "contents": { "source": "data:;base64,QQ==" } }))
            .collect();
        entries.push(json!({ "path": "/dup", "contents": { "source": "data:;base64,QQ==" } }));
        entries.push(json!({ "path": "dup", "contents": { "source": "data:;base64,Qg==" } }));
        let mut d = doc(json!({ "storage": { "files": entries } }));
        let config = TranscodeConfig::builder()
            .concurrency(8)
            .diagnostics(Arc::new(NoopDiagnostics))
            .build()
            .unwrap();

        transform(&mut d, tmp.path(), Direction::Decode, &config)
            .await
            .unwrap();

        assert_eq!(std::fs::read(tmp.path().join("dup")).unwrap(), b"B");
    }

    #[tokio::test]
    async fn entry_over_decoded_document_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/etc/motd", "contents": { "source": "data:;base64,QQ==" } },
                { "path": "/decoded.ign", "contents": { "source": "data:text/plain;base64,QQ==" } }
            ] }
        }));

        let err = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap_err();

        match err {
            TranscodeError::ReservedTarget { entry_path, target } => {
                assert_eq!(entry_path, "/decoded.ign");
                assert_eq!(target, tmp.path().join("decoded.ign"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!tmp.path().join("etc/motd").exists(), "nothing may be written");
    }

    #[tokio::test]
    async fn append_under_decoded_document_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/decoded.ign", "append": [ { "source": "data:;base64,QQ==" } ] }
            ] }
        }));

        let err = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap_err();

        assert!(matches!(err, TranscodeError::ReservedTarget { .. }));
        assert!(!tmp.path().join("decoded.ign").exists());
    }

    #[tokio::test]
    async fn top_level_document_extension_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/config.ign", "contents": { "source": "data:;base64,QQ==" } }
            ] }
        }));

        let err = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap_err();

        assert!(matches!(err, TranscodeError::ReservedTarget { .. }));
        assert!(!tmp.path().join("config.ign").exists());
    }

    #[tokio::test]
    async fn nested_document_extension_is_allowed() {
        let tmp = TempDir::new().unwrap();
        let mut d = doc(json!({
            "storage": { "files": [
                { "path": "/etc/config.ign", "contents": { "source": "data:;base64,QQ==" } }
            ] }
        }));

        transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        assert_eq!(std::fs::read(tmp.path().join("etc/config.ign")).unwrap(), b"A");
    }

    #[tokio::test]
    async fn concurrency_does_not_change_result() {
        let entries: Vec<Value> = (0..16)
            .map(|i| json!({ "path": format!("/f/{i}"), "contents": { "source": "data:;base64,QQ==" } }))
            .collect();
        let input = json!({ "storage": { "files": entries } });

        let seq_dir = TempDir::new().unwrap();
        let mut sequential = doc(input.clone());
        transform(&mut sequential, seq_dir.path(), Direction::Decode, &quiet())
            .await
            .unwrap();

        let par_dir = TempDir::new().unwrap();
        let mut parallel = doc(input);
        let config = TranscodeConfig::builder()
            .concurrency(8)
            .diagnostics(Arc::new(NoopDiagnostics))
            .build()
            .unwrap();
        transform(&mut parallel, par_dir.path(), Direction::Decode, &config)
            .await
            .unwrap();

        assert_eq!(sequential, parallel);
        for i in 0..16 {
            assert_eq!(std::fs::read(par_dir.path().join(format!("f/{i}"))).unwrap(), b"A");
        }
    }

    #[tokio::test]
    async fn document_without_files_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let original = json!({ "ignition": { "version": "3.4.0" } });
        let mut d = doc(original.clone());
        let stats = transform(&mut d, tmp.path(), Direction::Decode, &quiet())
            .await
            .unwrap();
        assert_eq!(d.as_value(), &original);
        assert_eq!(stats, TransformStats::default());
    }
}

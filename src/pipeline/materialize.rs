//! On-disk layout of extracted payloads.
//!
//! ```text
//! <root>/<entry path without leading '/'>            contents payload
//! <root>/<entry path without leading '/'>/<index>    append[index] payload
//! ```
//!
//! The layout is the compatibility contract between a decode pass and a later
//! encode pass, so it must not change.

use crate::error::TranscodeError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Entry path relative to the target root: exactly one leading `/` removed.
pub fn relative_path(entry_path: &str) -> &str {
    entry_path.strip_prefix('/').unwrap_or(entry_path)
}

/// File holding the `contents` payload of an entry.
pub fn contents_target(root: &Path, entry_path: &str) -> Result<PathBuf, TranscodeError> {
    Ok(root.join(checked_relative(entry_path)?))
}

/// File holding the payload of `append[index]` of an entry.
pub fn append_target(root: &Path, entry_path: &str, index: usize) -> Result<PathBuf, TranscodeError> {
    Ok(root
        .join(checked_relative(entry_path)?)
        .join(index.to_string()))
}

// Only plain components may remain, or the join could leave `root`.
fn checked_relative(entry_path: &str) -> Result<&Path, TranscodeError> {
    let relative = Path::new(relative_path(entry_path));
    let mut components = relative.components().peekable();
    if components.peek().is_none() {
        return Err(TranscodeError::UnsafePath {
            entry_path: entry_path.to_string(),
        });
    }
    if components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        Ok(relative)
    } else {
        Err(TranscodeError::UnsafePath {
            entry_path: entry_path.to_string(),
        })
    }
}

/// Whether a decode `target` would clash with the rewritten document.
///
/// `<root>/<decoded_file_name>` and anything below it are taken by the
/// document itself. A file directly in `<root>` with `document_extension`
/// would become a second document candidate for the encoder.
pub fn is_reserved(
    root: &Path,
    target: &Path,
    decoded_file_name: &str,
    document_extension: &str,
) -> bool {
    if target.starts_with(root.join(decoded_file_name)) {
        return true;
    }
    target.parent() == Some(root)
        && target.extension().and_then(|e| e.to_str()) == Some(document_extension)
}

/// Create every missing ancestor of `path`, then create or truncate it with `bytes`.
pub async fn write(path: &Path, bytes: &[u8]) -> Result<(), TranscodeError> {
    let write_err = |source| TranscodeError::FileWriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(write_err)
}

/// Read the whole file. A missing file is a [`TranscodeError::FileReadError`]
/// with kind `NotFound`.
pub async fn read(path: &Path) -> Result<Vec<u8>, TranscodeError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            return Err(TranscodeError::FileReadError {
                path: path.to_path_buf(),
                source: std::io::Error::new(ErrorKind::Other, "is a directory, expected a file"),
            })
        }
        _ => {}
    }

    tokio::fs::read(path)
        .await
        .map_err(|source| TranscodeError::FileReadError {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn strips_exactly_one_leading_slash() {
        assert_eq!(relative_path("/etc/motd"), "etc/motd");
        assert_eq!(relative_path("etc/motd"), "etc/motd");
        assert_eq!(relative_path("//etc/motd"), "/etc/motd");
    }

    #[test]
    fn targets_follow_layout() {
        let root = Path::new("/out");
        assert_eq!(
            contents_target(root, "/etc/motd").unwrap(),
            PathBuf::from("/out/etc/motd")
        );
        assert_eq!(
            append_target(root, "/etc/motd", 0).unwrap(),
            PathBuf::from("/out/etc/motd/0")
        );
        assert_eq!(
            append_target(root, "var/log/x", 12).unwrap(),
            PathBuf::from("/out/var/log/x/12")
        );
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let root = Path::new("/out");
        for bad in ["/../etc/passwd", "/etc/../../x", "//etc/shadow", "/"] {
            let err = contents_target(root, bad).unwrap_err();
            assert!(
                matches!(err, TranscodeError::UnsafePath { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn document_paths_are_reserved() {
        let root = Path::new("/out");
        let reserved = |t: &str| is_reserved(root, Path::new(t), "decoded.ign", "ign");

        assert!(reserved("/out/decoded.ign"));
        assert!(reserved("/out/./decoded.ign"));
        assert!(reserved("/out/decoded.ign/0"));
        assert!(reserved("/out/config.ign"));

        assert!(!reserved("/out/etc/config.ign"));
        assert!(!reserved("/out/config.ign/0"));
        assert!(!reserved("/out/decoded.ignx"));
        assert!(!reserved("/out/etc/motd"));
    }

    #[tokio::test]
    async fn write_creates_parents_and_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c");

        write(&path, b"first, longer content").await.unwrap();
        write(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn read_missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing");
        match read(&path).await.unwrap_err() {
            TranscodeError::FileReadError { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = read(tmp.path()).await.unwrap_err();
        assert!(matches!(err, TranscodeError::FileReadError { .. }));
    }
}

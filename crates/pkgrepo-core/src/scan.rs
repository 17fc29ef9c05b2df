use std::{
    fs::Metadata,
    path::{Path, PathBuf},
};

use pkgrepo_utils::{error::FileSystemError, fs::walk_dir};
use tracing::trace;

/// A regular file whose name carries a recognized archive suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Size of the archive file on disk, in bytes.
    pub size: i64,
}

/// Returns true if the file name of `path` ends with one of `extensions`.
///
/// Matching is exact and case-sensitive. A file named just like the suffix (`.tgz`) matches.
pub fn has_archive_suffix<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| name.ends_with(ext.as_ref()))
}

/// Walks `root` and calls `action` for every archive candidate, in traversal order.
///
/// Symlinks are not followed and only regular files are considered. An error returned by
/// `action` stops the walk.
pub fn visit_archives<S, F, E>(root: &Path, extensions: &[S], mut action: F) -> Result<(), E>
where
    S: AsRef<str>,
    F: FnMut(Candidate) -> Result<(), E>,
    E: From<FileSystemError>,
{
    walk_dir(root, &mut |path: &Path, metadata: &Metadata| {
        if !has_archive_suffix(path, extensions) {
            trace!(path = %path.display(), "not an archive");
            return Ok(());
        }
        action(Candidate {
            path: path.to_path_buf(),
            size: i64::try_from(metadata.len()).unwrap_or(i64::MAX),
        })
    })
}

/// Collects every archive candidate under `root`.
pub fn scan_archives<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<Vec<Candidate>, FileSystemError> {
    let mut candidates = Vec::new();
    visit_archives(root, extensions, |candidate| -> Result<(), FileSystemError> {
        candidates.push(candidate);
        Ok(())
    })?;
    Ok(candidates)
}

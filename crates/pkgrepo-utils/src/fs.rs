use std::{
    fs::{self, Metadata},
    io,
    path::Path,
};

use tracing::warn;

use crate::error::{FileSystemError, FileSystemResult};

/// Checks that `path` exists and is a directory.
///
/// The final path component is resolved like `stat(2)` does, so a symlink pointing at a
/// directory is accepted as a root.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the path cannot be inspected (missing, permission denied).
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_is_dir<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|err| {
        FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "access",
            source: err,
        }
    })?;

    if !metadata.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Removes the file at `path` if there is one.
///
/// Returns `Ok(true)` when a file was removed and `Ok(false)` when nothing existed. Unlike a
/// recursive removal, a directory sitting at `path` is reported as an error and left untouched.
///
/// # Errors
///
/// * [`FileSystemError::IsADirectory`] if `path` is a directory.
/// * [`FileSystemError::File`] if the removal fails for any other reason.
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<bool> {
    let path = path.as_ref();

    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            return Err(FileSystemError::IsADirectory {
                path: path.to_path_buf(),
            })
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(FileSystemError::File {
                path: path.to_path_buf(),
                action: "inspect",
                source: err,
            })
        }
    }

    fs::remove_file(path).map_err(|err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "remove",
            source: err,
        }
    })?;
    Ok(true)
}

/// Walks `dir` physically, calling `action` for every regular file.
///
/// Symbolic links are never followed: a symlink (to a file or to a directory) is neither
/// reported nor descended into. Directories, devices, sockets and FIFOs are skipped. Entries
/// of each directory are visited sorted by file name, depth first, so the order is stable
/// for a given snapshot of the tree.
///
/// A subdirectory that cannot be read is logged and skipped; only a failure to read `dir`
/// itself is an error.
///
/// # Errors
///
/// Returns [`FileSystemError::Directory`] (converted into `E`) if `dir` cannot be read, or
/// any error returned by `action`, which stops the walk.
pub fn walk_dir<P, F, E>(dir: P, action: &mut F) -> Result<(), E>
where
    P: AsRef<Path>,
    F: FnMut(&Path, &Metadata) -> Result<(), E>,
    E: From<FileSystemError>,
{
    let dir = dir.as_ref();
    let entries = read_sorted(dir).map_err(|err| {
        FileSystemError::Directory {
            path: dir.to_path_buf(),
            action: "read",
            source: err,
        }
    })?;
    visit_entries(entries, action)
}

fn visit_entries<F, E>(entries: Vec<fs::DirEntry>, action: &mut F) -> Result<(), E>
where
    F: FnMut(&Path, &Metadata) -> Result<(), E>,
    E: From<FileSystemError>,
{
    for entry in entries {
        let path = entry.path();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), "skipping unreadable entry: {err}");
                continue;
            }
        };

        let file_type = metadata.file_type();
        if file_type.is_dir() {
            match read_sorted(&path) {
                Ok(children) => visit_entries(children, action)?,
                Err(err) => warn!(path = %path.display(), "skipping unreadable directory: {err}"),
            }
        } else if file_type.is_file() {
            action(&path, &metadata)?;
        }
    }
    Ok(())
}

fn read_sorted(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

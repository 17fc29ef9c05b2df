//! Error types for the package crate.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading a package archive.
///
/// Every variant means the archive is unusable as a catalog entry; the catalog builder skips
/// the archive and carries on with the next one.
#[derive(Error, Diagnostic, Debug)]
pub enum PackageError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(pkgrepo_package::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Failed to read archive `{}`: {source}", path.display())]
    #[diagnostic(
        code(pkgrepo_package::archive),
        help("The archive may be truncated or not a tar stream")
    )]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Archive `{}` has no {name} entry", path.display())]
    #[diagnostic(
        code(pkgrepo_package::missing_manifest),
        help("Package archives must carry a manifest at the archive root")
    )]
    MissingManifest { path: PathBuf, name: &'static str },

    #[error("Invalid manifest in `{}`: {source}", path.display())]
    #[diagnostic(
        code(pkgrepo_package::invalid_manifest),
        help("The manifest must be a JSON object")
    )]
    InvalidManifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Manifest in `{}` is missing required field `{field}`", path.display())]
    #[diagnostic(code(pkgrepo_package::missing_field))]
    MissingField { path: PathBuf, field: &'static str },
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            PackageError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

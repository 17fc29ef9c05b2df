//! Error types for pkgrepo-core.

use std::path::PathBuf;

use miette::Diagnostic;
use pkgrepo_config::ConfigError;
use pkgrepo_db::DbError;
use pkgrepo_utils::error::FileSystemError;
use thiserror::Error;

/// Fatal errors of a catalog build.
///
/// Unreadable archives are not errors at this level: they are skipped and counted in
/// [`RepoSummary::failed`](crate::RepoSummary::failed).
#[derive(Error, Diagnostic, Debug)]
pub enum RepoError {
    #[error("Invalid repository root `{}`", path.display())]
    #[diagnostic(
        code(pkgrepo::invalid_root),
        help("Pass an existing directory containing package archives")
    )]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, RepoError>;

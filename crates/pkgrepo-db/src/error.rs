//! Error types for pkgrepo-db.

use std::path::PathBuf;

use miette::Diagnostic;
use pkgrepo_utils::error::FileSystemError;
use thiserror::Error;

/// Database error type for catalog operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error("Failed to open catalog `{}`: {source}", path.display())]
    #[diagnostic(
        code(pkgrepo_db::connection),
        help("Check that the repository directory is writable")
    )]
    ConnectionError {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Failed to create catalog schema: {0}")]
    #[diagnostic(
        code(pkgrepo_db::schema),
        help("Check disk space and that no other process holds the catalog open")
    )]
    SchemaError(#[source] rusqlite::Error),

    #[error("Catalog query failed: {0}")]
    #[diagnostic(code(pkgrepo_db::query))]
    QueryError(#[from] rusqlite::Error),

    #[error("Duplicate {table} row for {key}")]
    #[diagnostic(
        code(pkgrepo_db::conflict),
        help("Remove the duplicate archive, or choose the `skip` or `replace` conflict policy")
    )]
    Conflict { table: &'static str, key: String },
}

/// Result type alias for pkgrepo-db operations.
pub type Result<T> = std::result::Result<T, DbError>;

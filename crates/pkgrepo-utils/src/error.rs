use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum FileSystemError {
    #[error("Failed to {action} file `{}`: {source}", path.display())]
    #[diagnostic(
        code(pkgrepo_utils::file),
        help("Check file permissions and disk space")
    )]
    File {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {action} directory `{}`: {source}", path.display())]
    #[diagnostic(
        code(pkgrepo_utils::directory),
        help("Check that the directory exists and is readable")
    )]
    Directory {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not a directory", path.display())]
    #[diagnostic(
        code(pkgrepo_utils::not_a_directory),
        help("Provide the path of an existing directory")
    )]
    NotADirectory { path: PathBuf },

    #[error("`{}` is a directory", path.display())]
    #[diagnostic(
        code(pkgrepo_utils::is_a_directory),
        help("Move the directory out of the way or choose another file name")
    )]
    IsADirectory { path: PathBuf },
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;

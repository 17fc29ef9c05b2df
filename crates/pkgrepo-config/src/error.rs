use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(pkgrepo_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pkgrepo_config::toml_deserialize),
        help("Check your config file syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {}", .0.display())]
    #[diagnostic(
        code(pkgrepo_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(PathBuf),

    #[error("Invalid catalog name: {0:?}")]
    #[diagnostic(
        code(pkgrepo_config::invalid_catalog_name),
        help("The catalog name must be a plain, non-empty file name such as `repo.db`")
    )]
    InvalidCatalogName(String),

    #[error("Invalid archive extension: {0:?}")]
    #[diagnostic(
        code(pkgrepo_config::invalid_extension),
        help("Archive extensions must start with a dot, e.g. `.txz`")
    )]
    InvalidExtension(String),

    #[error("Catalog name {0:?} ends with an archive extension")]
    #[diagnostic(
        code(pkgrepo_config::catalog_is_archive),
        help("The catalog would be scanned as a package archive; pick another name")
    )]
    CatalogNameIsArchive(String),

    #[error("Unknown conflict policy: {0:?}")]
    #[diagnostic(
        code(pkgrepo_config::conflict_policy),
        help("Valid policies are `skip`, `abort` and `replace`")
    )]
    InvalidConflictPolicy(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(pkgrepo_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

//! Package archive reading for the pkgrepo catalog builder.
//!
//! A package archive is a tarball (optionally gzip, bzip2 or xz compressed) carrying a
//! `+MANIFEST` entry that describes the package, its dependencies and the files it installs.
//! This crate exposes the [`PackageReader`] seam used by the catalog builder together with the
//! default [`TarballReader`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pkgrepo_package::{PackageField, PackageReader, TarballReader};
//!
//! fn origin_of(path: &Path) -> Result<Option<String>, pkgrepo_package::PackageError> {
//!     let package = TarballReader.open(path)?;
//!     Ok(package.get(PackageField::Origin).map(String::from))
//! }
//! ```

pub mod archive;
pub mod compression;
pub mod error;
pub mod manifest;
pub mod reader;

pub use archive::{DependencyStub, FileStub, PackageArchive, PackageField};
pub use compression::Compression;
pub use error::{ErrorContext, PackageError, Result};
pub use manifest::MANIFEST_NAME;
pub use reader::{PackageReader, TarballReader};

//! Builds the catalog of a package repository.
//!
//! [`create_repo`] walks a repository directory, opens every file carrying an archive suffix
//! with a [`PackageReader`](pkgrepo_package::PackageReader) and writes the packages, their
//! dependencies and their files into a fresh SQLite catalog at the repository root.
//!
//! ```no_run
//! let summary = pkgrepo_core::create_repo_default("/usr/ports/packages")?;
//! println!("{} packages", summary.stats.packages);
//! # Ok::<(), pkgrepo_core::RepoError>(())
//! ```

pub mod error;
pub mod progress;
pub mod repo;
pub mod scan;

pub use error::{RepoError, Result};
pub use progress::{
    ChannelProgress, CollectorProgress, FnProgress, NullProgress, ProgressEvent, ProgressHook,
};
pub use repo::{create_repo, create_repo_default, CreateOptions, RepoSummary};
pub use scan::{has_archive_suffix, scan_archives, visit_archives, Candidate};

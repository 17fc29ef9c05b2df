use std::path::{Path, PathBuf};

use pkgrepo_config::{Config, ConflictPolicy};
use pkgrepo_db::{CatalogStats, CatalogWriter};
use pkgrepo_package::{PackageReader, TarballReader};
use pkgrepo_utils::fs::ensure_is_dir;
use tracing::{debug, info, warn};

use crate::{
    error::{RepoError, Result},
    progress::ProgressHook,
    scan::visit_archives,
};

/// Settings of a single catalog build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// File name of the catalog, created directly under the root.
    pub catalog_name: String,
    pub archive_extensions: Vec<String>,
    pub conflict_policy: ConflictPolicy,
}

impl CreateOptions {
    /// Builds options from a configuration, filling in defaults and validating it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut config = config.clone();
        config.resolve()?;
        Ok(Self {
            catalog_name: config.catalog_name().to_string(),
            archive_extensions: config.archive_extensions(),
            conflict_policy: config.conflict_policy(),
        })
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        let mut config = Config {
            catalog_name: Some(self.catalog_name.clone()),
            archive_extensions: Some(self.archive_extensions.clone()),
            conflict_policy: Some(self.conflict_policy),
        };
        config.resolve()?;
        Ok(())
    }
}

impl Default for CreateOptions {
    fn default() -> Self {
        let config = Config::default_config();
        Self {
            catalog_name: config.catalog_name().to_string(),
            archive_extensions: config.archive_extensions(),
            conflict_policy: config.conflict_policy(),
        }
    }
}

/// Outcome of a successful catalog build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    pub root: PathBuf,
    pub catalog_path: PathBuf,
    /// Archive candidates found by the scan.
    pub scanned: usize,
    /// Candidates the reader could not open. They contributed no rows.
    pub failed: usize,
    pub stats: CatalogStats,
}

/// Builds the catalog for the repository at `root` with the default reader and options
/// and no progress reporting.
pub fn create_repo_default<P: AsRef<Path>>(root: P) -> Result<RepoSummary> {
    create_repo(root.as_ref(), &CreateOptions::default(), &TarballReader, None)
}

/// Scans `root` for package archives and writes a fresh catalog at
/// `root/<catalog_name>`.
///
/// An existing catalog is replaced. Archives that `reader` cannot open are logged and
/// skipped. Every row is written in one transaction, committed only after the whole tree
/// has been scanned; `progress` sees each package before its rows are written and the
/// summary once after the commit.
///
/// # Errors
///
/// * [`RepoError::Config`] if `options` are invalid.
/// * [`RepoError::InvalidRoot`] if `root` is not an existing directory. Nothing on disk is
///   touched in that case.
/// * [`RepoError::Database`] if the catalog cannot be created or written, including a
///   [`DbError::Conflict`](pkgrepo_db::DbError::Conflict) under
///   [`ConflictPolicy::Abort`]. The incomplete catalog file is removed.
pub fn create_repo<R>(
    root: &Path,
    options: &CreateOptions,
    reader: &R,
    progress: Option<&dyn ProgressHook>,
) -> Result<RepoSummary>
where
    R: PackageReader + ?Sized,
{
    options.validate()?;
    ensure_is_dir(root).map_err(|source| {
        RepoError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        }
    })?;

    let catalog_path = root.join(&options.catalog_name);
    info!(
        root = %root.display(),
        catalog = %catalog_path.display(),
        policy = %options.conflict_policy,
        "building catalog"
    );

    let mut writer = CatalogWriter::create(&catalog_path, options.conflict_policy)?;
    let summary = match populate(&mut writer, root, options, reader, progress) {
        Ok(summary) => summary,
        Err(err) => {
            if let Err(cleanup) = writer.discard() {
                warn!(
                    path = %catalog_path.display(),
                    "failed to remove incomplete catalog: {cleanup}"
                );
            }
            return Err(err);
        }
    };
    writer.close()?;

    info!(
        scanned = summary.scanned,
        failed = summary.failed,
        packages = summary.stats.packages,
        "catalog written to {}",
        summary.catalog_path.display()
    );
    if let Some(progress) = progress {
        progress.scan_complete(&summary);
    }
    Ok(summary)
}

fn populate<R>(
    writer: &mut CatalogWriter,
    root: &Path,
    options: &CreateOptions,
    reader: &R,
    progress: Option<&dyn ProgressHook>,
) -> Result<RepoSummary>
where
    R: PackageReader + ?Sized,
{
    let mut tx = writer.begin()?;
    let mut scanned = 0;
    let mut failed = 0;

    visit_archives(root, &options.archive_extensions, |candidate| -> Result<()> {
        scanned += 1;
        debug!(path = %candidate.path.display(), size = candidate.size, "reading archive");

        let package = match reader.open(&candidate.path) {
            Ok(package) => package,
            Err(err) => {
                warn!(path = %candidate.path.display(), "skipping unreadable archive: {err}");
                failed += 1;
                return Ok(());
            }
        };

        if let Some(progress) = progress {
            progress.package_processed(&package);
        }
        tx.insert_package(&package, candidate.size)?;
        Ok(())
    })?;

    let stats = tx.commit()?;
    Ok(RepoSummary {
        root: root.to_path_buf(),
        catalog_path: writer.path().to_path_buf(),
        scanned,
        failed,
        stats,
    })
}

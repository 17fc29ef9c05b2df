use std::path::{Path, PathBuf};

use pkgrepo_config::ConflictPolicy;
use pkgrepo_package::{DependencyStub, FileStub, PackageArchive};
use pkgrepo_utils::fs::remove_file_if_exists;
use rusqlite::{ffi, params, Connection, ErrorCode, Transaction, TransactionBehavior};
use tracing::{debug, warn};

use crate::{
    error::{DbError, Result},
    schema::SCHEMA,
    statements::CatalogStatements,
};

/// Row counts of a catalog build.
///
/// `packages`, `dependencies` and `files` are the rows present in the catalog, so rows
/// removed by a replacement are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub packages: usize,
    pub dependencies: usize,
    pub files: usize,
    pub replaced_packages: usize,
    pub skipped_packages: usize,
    pub skipped_rows: usize,
}

/// What happened to a package handed to [`CatalogTransaction::insert_package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An earlier package with the same origin was removed first.
    Replaced,
    /// The origin was already present; nothing was written.
    Skipped,
}

/// Owns the connection to a catalog that is being built.
///
/// The connection is closed when the writer is dropped.
pub struct CatalogWriter {
    conn: Connection,
    path: PathBuf,
    policy: ConflictPolicy,
}

impl CatalogWriter {
    /// Creates an empty catalog at `path`.
    ///
    /// Any file already at `path` is deleted first. If the schema cannot be created the new
    /// file is removed again before the error is returned.
    pub fn create<P: AsRef<Path>>(path: P, policy: ConflictPolicy) -> Result<Self> {
        let path = path.as_ref();

        if remove_file_if_exists(path)? {
            debug!(path = %path.display(), "removed stale catalog");
        }

        let conn = Connection::open(path).map_err(|source| {
            DbError::ConnectionError {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let schema = conn
            .pragma_update(None, "foreign_keys", true)
            .and_then(|_| conn.execute_batch(SCHEMA));
        if let Err(err) = schema {
            drop(conn);
            if let Err(cleanup) = remove_file_if_exists(path) {
                warn!(path = %path.display(), "failed to remove partial catalog: {cleanup}");
            }
            return Err(DbError::SchemaError(err));
        }

        debug!(path = %path.display(), %policy, "created catalog schema");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            policy,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the write transaction and prepares the insert statements.
    ///
    /// Nothing written through the returned transaction is visible to other connections
    /// until [`CatalogTransaction::commit`]; dropping it uncommitted rolls everything back.
    pub fn begin(&mut self) -> Result<CatalogTransaction<'_>> {
        let conn = &self.conn;
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let statements = CatalogStatements::new(conn)?;

        Ok(CatalogTransaction {
            statements,
            tx,
            policy: self.policy,
            stats: CatalogStats::default(),
        })
    }

    /// Closes the connection, reporting errors that a plain drop would swallow.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| DbError::QueryError(err))
    }

    /// Closes the connection and deletes the catalog file.
    pub fn discard(self) -> Result<()> {
        let Self { conn, path, .. } = self;
        drop(conn);
        remove_file_if_exists(&path)?;
        debug!(path = %path.display(), "discarded incomplete catalog");
        Ok(())
    }
}

/// The single write transaction of a catalog build.
///
/// Fields drop in declaration order: the prepared statements are finalized before the
/// transaction is rolled back.
pub struct CatalogTransaction<'conn> {
    statements: CatalogStatements<'conn>,
    tx: Transaction<'conn>,
    policy: ConflictPolicy,
    stats: CatalogStats,
}

impl<'conn> CatalogTransaction<'conn> {
    /// Writes the package row, then one row per dependency, then one row per file.
    pub fn insert_package(&mut self, package: &PackageArchive, size: i64) -> Result<InsertOutcome> {
        let origin = package.origin.as_str();

        let outcome = match self.statements.insert_package(package, size) {
            Ok(()) => InsertOutcome::Inserted,
            Err(err) if is_conflict(&err) => {
                match self.policy {
                    ConflictPolicy::Skip => {
                        warn!(origin, "skipping package with duplicate origin");
                        self.stats.skipped_packages += 1;
                        return Ok(InsertOutcome::Skipped);
                    }
                    ConflictPolicy::Abort => {
                        return Err(DbError::Conflict {
                            table: "packages",
                            key: origin.to_string(),
                        });
                    }
                    ConflictPolicy::Replace => {
                        warn!(origin, "replacing package with duplicate origin");
                        self.delete_package(origin)?;
                        self.statements.insert_package(package, size)?;
                        InsertOutcome::Replaced
                    }
                }
            }
            Err(err) => return Err(err.into()),
        };

        match outcome {
            InsertOutcome::Replaced => self.stats.replaced_packages += 1,
            _ => self.stats.packages += 1,
        }

        for dependency in package.dependencies() {
            self.insert_dependency(dependency, origin)?;
        }
        for file in package.files() {
            self.insert_file(file, origin)?;
        }

        debug!(
            origin,
            deps = package.dependencies().len(),
            files = package.files().len(),
            ?outcome,
            "wrote package"
        );
        Ok(outcome)
    }

    /// Finalizes the statements and commits. This is the only point at which the catalog
    /// becomes valid.
    pub fn commit(self) -> Result<CatalogStats> {
        let CatalogTransaction {
            statements,
            tx,
            stats,
            ..
        } = self;

        statements.finalize()?;
        tx.commit()?;

        debug!(
            packages = stats.packages,
            deps = stats.dependencies,
            files = stats.files,
            "committed catalog"
        );
        Ok(stats)
    }

    fn insert_dependency(&mut self, dependency: &DependencyStub, origin: &str) -> Result<()> {
        match self.statements.insert_dependency(dependency, origin) {
            Ok(()) => {
                self.stats.dependencies += 1;
                Ok(())
            }
            Err(err) if is_conflict(&err) => {
                let key = format!("{origin} -> {}", dependency.origin);
                if self.replace_row("deps", key)? {
                    self.tx
                        .prepare_cached("DELETE FROM deps WHERE package_id = ?1 AND origin = ?2")?
                        .execute(params![origin, dependency.origin])?;
                    self.statements.insert_dependency(dependency, origin)?;
                }
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn insert_file(&mut self, file: &FileStub, origin: &str) -> Result<()> {
        match self.statements.insert_file(file, origin) {
            Ok(()) => {
                self.stats.files += 1;
                Ok(())
            }
            Err(err) if is_conflict(&err) => {
                let key = format!("{origin}: {}", file.path);
                if self.replace_row("files", key)? {
                    self.tx
                        .prepare_cached("DELETE FROM files WHERE package_id = ?1 AND path = ?2")?
                        .execute(params![origin, file.path])?;
                    self.statements.insert_file(file, origin)?;
                }
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the policy to a colliding dependency or file row. Returns whether the row
    /// should replace the existing one.
    fn replace_row(&mut self, table: &'static str, key: String) -> Result<bool> {
        match self.policy {
            ConflictPolicy::Skip => {
                warn!(table, key = %key, "skipping duplicate row");
                self.stats.skipped_rows += 1;
                Ok(false)
            }
            ConflictPolicy::Abort => Err(DbError::Conflict { table, key }),
            ConflictPolicy::Replace => {
                debug!(table, key = %key, "replacing duplicate row");
                Ok(true)
            }
        }
    }

    fn delete_package(&mut self, origin: &str) -> Result<()> {
        let deps = self
            .tx
            .prepare_cached("DELETE FROM deps WHERE package_id = ?1")?
            .execute([origin])?;
        let files = self
            .tx
            .prepare_cached("DELETE FROM files WHERE package_id = ?1")?
            .execute([origin])?;
        self.tx
            .prepare_cached("DELETE FROM packages WHERE origin = ?1")?
            .execute([origin])?;

        self.stats.dependencies = self.stats.dependencies.saturating_sub(deps);
        self.stats.files = self.stats.files.saturating_sub(files);
        Ok(())
    }
}

fn is_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::catalog::Catalog;

    fn package(origin: &str, deps: &[&str], files: &[&str]) -> PackageArchive {
        let name = origin.rsplit('/').next().unwrap().to_string();
        PackageArchive {
            origin: origin.to_string(),
            name: Some(name.clone()),
            version: Some("1.0".into()),
            comment: Some(format!("{name} comment")),
            deps: Some(
                deps.iter()
                    .map(|dep| {
                        DependencyStub {
                            origin: dep.to_string(),
                            name: dep.rsplit('/').next().map(str::to_string),
                            version: Some("2.0".into()),
                        }
                    })
                    .collect(),
            ),
            files: Some(
                files
                    .iter()
                    .map(|path| {
                        FileStub {
                            path: path.to_string(),
                            size: 10,
                        }
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_replaces_stale_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");
        fs::write(&path, "not a database").unwrap();

        let writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        writer.close().unwrap();

        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.count_packages().unwrap(), 0);
    }

    #[test]
    fn test_create_fails_on_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            CatalogWriter::create(&path, ConflictPolicy::Skip),
            Err(DbError::FileSystem(_))
        ));
    }

    #[test]
    fn test_insert_and_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        let mut tx = writer.begin().unwrap();
        let outcome = tx
            .insert_package(
                &package("ftp/curl", &["security/ca_root_nss", "www/libnghttp2"], &["/usr/local/bin/curl"]),
                4096,
            )
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        let stats = tx.commit().unwrap();
        writer.close().unwrap();

        assert_eq!(stats.packages, 1);
        assert_eq!(stats.dependencies, 2);
        assert_eq!(stats.files, 1);

        let catalog = Catalog::open(&path).unwrap();
        let row = catalog.find_package("ftp/curl").unwrap().unwrap();
        assert_eq!(row.size, 4096);
        assert_eq!(row.comment.as_deref(), Some("curl comment"));
        assert_eq!(catalog.dependencies_of("ftp/curl").unwrap().len(), 2);
        assert_eq!(catalog.files_of("ftp/curl").unwrap().len(), 1);
    }

    #[test]
    fn test_uncommitted_rows_are_rolled_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        {
            let mut tx = writer.begin().unwrap();
            tx.insert_package(&package("ftp/curl", &[], &[]), 1).unwrap();
        }
        writer.close().unwrap();

        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.count_packages().unwrap(), 0);
    }

    #[test]
    fn test_uncommitted_rows_are_invisible_to_readers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        let mut tx = writer.begin().unwrap();
        tx.insert_package(&package("ftp/curl", &["a/b"], &["/x"]), 1)
            .unwrap();

        // The reserved write lock may make the reader fail outright; either way it must not
        // observe the pending row.
        if let Ok(catalog) = Catalog::open(&path) {
            if let Ok(count) = catalog.count_packages() {
                assert_eq!(count, 0);
            }
        }

        tx.commit().unwrap();
        writer.close().unwrap();
        assert_eq!(Catalog::open(&path).unwrap().count_packages().unwrap(), 1);
    }

    #[test]
    fn test_discard_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        assert!(path.exists());
        writer.discard().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_skip_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Skip).unwrap();
        let mut tx = writer.begin().unwrap();
        tx.insert_package(&package("lang/python", &["lang/tcl"], &["/bin/python"]), 1)
            .unwrap();
        let outcome = tx
            .insert_package(
                &package("lang/python", &["devel/gettext"], &["/bin/python3"]),
                2,
            )
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Skipped);

        tx.insert_package(
            &package("lang/perl", &["lang/tcl", "lang/tcl"], &["/bin/perl", "/bin/perl"]),
            3,
        )
        .unwrap();
        let stats = tx.commit().unwrap();
        writer.close().unwrap();

        assert_eq!(stats.packages, 2);
        assert_eq!(stats.skipped_packages, 1);
        assert_eq!(stats.skipped_rows, 2);

        let catalog = Catalog::open(&path).unwrap();
        let python = catalog.find_package("lang/python").unwrap().unwrap();
        assert_eq!(python.size, 1);
        let deps = catalog.dependencies_of("lang/python").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].origin, "lang/tcl");
        assert_eq!(catalog.files_of("lang/python").unwrap()[0].path, "/bin/python");
        assert_eq!(catalog.dependencies_of("lang/perl").unwrap().len(), 1);
        assert_eq!(catalog.files_of("lang/perl").unwrap().len(), 1);
    }

    #[test]
    fn test_abort_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Abort).unwrap();
        let mut tx = writer.begin().unwrap();
        tx.insert_package(&package("lang/python", &[], &[]), 1)
            .unwrap();
        let err = tx
            .insert_package(&package("lang/python", &[], &[]), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Conflict { table: "packages", ref key } if key == "lang/python"
        ));

        let err = tx
            .insert_package(&package("lang/perl", &[], &["/bin/perl", "/bin/perl"]), 3)
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { table: "files", .. }));
    }

    #[test]
    fn test_replace_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");

        let mut writer = CatalogWriter::create(&path, ConflictPolicy::Replace).unwrap();
        let mut tx = writer.begin().unwrap();
        tx.insert_package(
            &package("lang/python", &["lang/tcl", "devel/gettext"], &["/bin/python"]),
            1,
        )
        .unwrap();
        let outcome = tx
            .insert_package(&package("lang/python", &["devel/libffi"], &["/bin/python3"]), 2)
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Replaced);
        let stats = tx.commit().unwrap();
        writer.close().unwrap();

        assert_eq!(stats.packages, 1);
        assert_eq!(stats.replaced_packages, 1);
        assert_eq!(stats.dependencies, 1);
        assert_eq!(stats.files, 1);

        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.find_package("lang/python").unwrap().unwrap().size, 2);
        let deps = catalog.dependencies_of("lang/python").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].origin, "devel/libffi");
        assert_eq!(catalog.owner_of("/bin/python").unwrap(), Vec::<String>::new());
        assert_eq!(catalog.owner_of("/bin/python3").unwrap(), vec!["lang/python"]);
    }
}

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Params};

use crate::{
    error::{DbError, Result},
    models::{DependencyRow, FileRow, FromRow, PackageRow},
};

const PACKAGE_COLUMNS: &str = "origin, name, version, comment, desc, arch, osversion, \
                               maintainer, www, pkg_format_version, size";

/// Read-only view of a committed catalog.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| {
            DbError::ConnectionError {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self { conn })
    }

    pub fn count_packages(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM packages")
    }

    pub fn count_dependencies(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM deps")
    }

    pub fn count_files(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM files")
    }

    /// All packages ordered by origin.
    pub fn packages(&self) -> Result<Vec<PackageRow>> {
        self.query(
            &format!("SELECT {PACKAGE_COLUMNS} FROM packages ORDER BY origin"),
            [],
        )
    }

    pub fn find_package(&self, origin: &str) -> Result<Option<PackageRow>> {
        let mut rows = self.query(
            &format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE origin = ?1"),
            [origin],
        )?;
        Ok(rows.pop())
    }

    /// All dependency rows ordered by owning package, then dependency origin.
    pub fn dependencies(&self) -> Result<Vec<DependencyRow>> {
        self.query(
            "SELECT package_id, origin, name, version FROM deps ORDER BY package_id, origin",
            [],
        )
    }

    pub fn dependencies_of(&self, origin: &str) -> Result<Vec<DependencyRow>> {
        self.query(
            "SELECT package_id, origin, name, version FROM deps
             WHERE package_id = ?1 ORDER BY origin",
            [origin],
        )
    }

    /// Rows of every package that depends on `origin`.
    pub fn reverse_dependencies(&self, origin: &str) -> Result<Vec<DependencyRow>> {
        self.query(
            "SELECT package_id, origin, name, version FROM deps
             WHERE origin = ?1 ORDER BY package_id",
            [origin],
        )
    }

    /// All file rows ordered by owning package, then path.
    pub fn files(&self) -> Result<Vec<FileRow>> {
        self.query(
            "SELECT package_id, path, size FROM files ORDER BY package_id, path",
            [],
        )
    }

    pub fn files_of(&self, origin: &str) -> Result<Vec<FileRow>> {
        self.query(
            "SELECT package_id, path, size FROM files WHERE package_id = ?1 ORDER BY path",
            [origin],
        )
    }

    /// Origins of the packages that install `path`.
    pub fn owner_of(&self, path: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT package_id FROM files WHERE path = ?1 ORDER BY package_id")?;
        let owners = stmt
            .query_map([path], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(owners)
    }

    /// Names of the user-defined tables and indexes, sorted.
    pub fn schema_objects(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT type, name FROM sqlite_master
             WHERE name NOT LIKE 'sqlite_%' ORDER BY type, name",
        )?;
        let objects = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(objects)
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn query<T: FromRow, P: Params>(&self, sql: &str, params: P) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, T::from_row)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use pkgrepo_config::ConflictPolicy;
    use pkgrepo_package::{DependencyStub, FileStub, PackageArchive};
    use tempfile::tempdir;

    use super::*;
    use crate::{
        schema::{INDEXES, TABLES},
        writer::CatalogWriter,
    };

    fn build(path: &Path) {
        let packages = [
            PackageArchive {
                origin: "ftp/curl".into(),
                name: Some("curl".into()),
                version: Some("8.10.1".into()),
                description: Some("Command line tool for transferring data".into()),
                format_version: Some(2),
                deps: Some(vec![DependencyStub {
                    origin: "security/openssl".into(),
                    name: Some("openssl".into()),
                    version: Some("3.0.15".into()),
                }]),
                files: Some(vec![
                    FileStub {
                        path: "/usr/local/bin/curl".into(),
                        size: 250_000,
                    },
                    FileStub {
                        path: "/usr/local/share/licenses/LICENSE".into(),
                        size: 1_000,
                    },
                ]),
                ..Default::default()
            },
            PackageArchive {
                origin: "ftp/wget".into(),
                name: Some("wget".into()),
                deps: Some(vec![DependencyStub {
                    origin: "security/openssl".into(),
                    name: Some("openssl".into()),
                    version: Some("3.0.15".into()),
                }]),
                files: Some(vec![FileStub {
                    path: "/usr/local/share/licenses/LICENSE".into(),
                    size: 1_000,
                }]),
                ..Default::default()
            },
        ];

        let mut writer = CatalogWriter::create(path, ConflictPolicy::Skip).unwrap();
        let mut tx = writer.begin().unwrap();
        for package in &packages {
            tx.insert_package(package, 100).unwrap();
        }
        tx.commit().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_schema_objects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");
        build(&path);

        let catalog = Catalog::open(&path).unwrap();
        let objects = catalog.schema_objects().unwrap();

        let tables: Vec<_> = objects
            .iter()
            .filter(|(kind, _)| kind == "table")
            .map(|(_, name)| name.as_str())
            .collect();
        let indexes: Vec<_> = objects
            .iter()
            .filter(|(kind, _)| kind == "index")
            .map(|(_, name)| name.as_str())
            .collect();

        let mut expected_tables = TABLES.to_vec();
        expected_tables.sort();
        assert_eq!(tables, expected_tables);
        assert_eq!(indexes, INDEXES.to_vec());
    }

    #[test]
    fn test_queries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");
        build(&path);

        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.count_packages().unwrap(), 2);
        assert_eq!(catalog.count_dependencies().unwrap(), 2);
        assert_eq!(catalog.count_files().unwrap(), 3);

        let curl = catalog.find_package("ftp/curl").unwrap().unwrap();
        assert_eq!(curl.version.as_deref(), Some("8.10.1"));
        assert_eq!(
            curl.description.as_deref(),
            Some("Command line tool for transferring data")
        );
        assert_eq!(curl.format_version, Some(2));
        assert_eq!(curl.maintainer, None);
        assert!(catalog.find_package("ftp/lftp").unwrap().is_none());

        let rdeps = catalog.reverse_dependencies("security/openssl").unwrap();
        let dependents: Vec<_> = rdeps.iter().map(|row| row.package_id.as_str()).collect();
        assert_eq!(dependents, ["ftp/curl", "ftp/wget"]);

        assert_eq!(
            catalog
                .owner_of("/usr/local/share/licenses/LICENSE")
                .unwrap(),
            ["ftp/curl", "ftp/wget"]
        );

        let files = catalog.files_of("ftp/curl").unwrap();
        assert_eq!(files[0].path, "/usr/local/bin/curl");
        assert_eq!(files[0].size, 250_000);
        assert_eq!(catalog.files().unwrap().len(), 3);
        assert_eq!(catalog.packages().unwrap().len(), 2);
    }

    #[test]
    fn test_open_missing_catalog() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Catalog::open(dir.path().join("repo.db")),
            Err(DbError::ConnectionError { .. })
        ));
    }

    #[test]
    fn test_catalog_is_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.db");
        build(&path);

        let catalog = Catalog::open(&path).unwrap();
        assert!(catalog
            .conn
            .execute("DELETE FROM packages", [])
            .is_err());
    }
}

use pkgrepo_package::{DependencyStub, FileStub, PackageArchive};
use rusqlite::{params, Connection, Statement};

/// The three insert statements a catalog build reuses for every package.
///
/// Every parameter is rebound on each call and rusqlite resets a statement once `execute`
/// returns, so no state leaks from one row into the next.
pub struct CatalogStatements<'a> {
    pub package_insert: Statement<'a>,
    pub dependency_insert: Statement<'a>,
    pub file_insert: Statement<'a>,
}

impl<'a> CatalogStatements<'a> {
    pub fn new(conn: &'a Connection) -> rusqlite::Result<Self> {
        Ok(Self {
            package_insert: conn.prepare(
                "INSERT INTO packages (
                    origin, name, version, comment, desc, arch, osversion,
                    maintainer, www, pkg_format_version, size
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?,
            dependency_insert: conn.prepare(
                "INSERT INTO deps (origin, name, version, package_id) VALUES (?1, ?2, ?3, ?4)",
            )?,
            file_insert: conn
                .prepare("INSERT INTO files (path, size, package_id) VALUES (?1, ?2, ?3)")?,
        })
    }

    pub fn insert_package(&mut self, package: &PackageArchive, size: i64) -> rusqlite::Result<()> {
        self.package_insert.execute(params![
            package.origin,
            package.name,
            package.version,
            package.comment,
            package.description,
            package.arch,
            package.osversion,
            package.maintainer,
            package.www,
            package.format_version,
            size
        ])?;
        Ok(())
    }

    pub fn insert_dependency(
        &mut self,
        dependency: &DependencyStub,
        package_id: &str,
    ) -> rusqlite::Result<()> {
        self.dependency_insert.execute(params![
            dependency.origin,
            dependency.name,
            dependency.version,
            package_id
        ])?;
        Ok(())
    }

    pub fn insert_file(&mut self, file: &FileStub, package_id: &str) -> rusqlite::Result<()> {
        self.file_insert
            .execute(params![file.path, file.size, package_id])?;
        Ok(())
    }

    /// Finalizes all statements, reporting the first error instead of discarding it on drop.
    pub fn finalize(self) -> rusqlite::Result<()> {
        let package = self.package_insert.finalize();
        let dependency = self.dependency_insert.finalize();
        let file = self.file_insert.finalize();
        package.and(dependency).and(file)
    }
}

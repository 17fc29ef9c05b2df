use rusqlite::Row;

/// Converts a database row into a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageRow {
    pub origin: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub arch: Option<String>,
    pub osversion: Option<String>,
    pub maintainer: Option<String>,
    pub www: Option<String>,
    pub format_version: Option<i64>,
    pub size: i64,
}

impl FromRow for PackageRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            origin: row.get("origin")?,
            name: row.get("name")?,
            version: row.get("version")?,
            comment: row.get("comment")?,
            description: row.get("desc")?,
            arch: row.get("arch")?,
            osversion: row.get("osversion")?,
            maintainer: row.get("maintainer")?,
            www: row.get("www")?,
            format_version: row.get("pkg_format_version")?,
            size: row.get("size")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DependencyRow {
    pub package_id: String,
    pub origin: String,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl FromRow for DependencyRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            package_id: row.get("package_id")?,
            origin: row.get("origin")?,
            name: row.get("name")?,
            version: row.get("version")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileRow {
    pub package_id: String,
    pub path: String,
    pub size: i64,
}

impl FromRow for FileRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            package_id: row.get("package_id")?,
            path: row.get("path")?,
            size: row.get("size")?,
        })
    }
}

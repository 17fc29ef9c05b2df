/// Catalog schema: three tables and four secondary indexes.
pub const SCHEMA: &str = "
CREATE TABLE packages (
    origin TEXT PRIMARY KEY,
    name TEXT,
    version TEXT,
    comment TEXT,
    desc TEXT,
    arch TEXT,
    osversion TEXT,
    maintainer TEXT,
    www TEXT,
    pkg_format_version INTEGER,
    size INTEGER
);
CREATE TABLE deps (
    origin TEXT,
    name TEXT,
    version TEXT,
    package_id TEXT REFERENCES packages(origin),
    PRIMARY KEY (package_id, origin)
);
CREATE INDEX deps_origin ON deps (origin);
CREATE INDEX deps_package ON deps (package_id);
CREATE TABLE files (
    path TEXT,
    size INTEGER,
    package_id TEXT REFERENCES packages(origin),
    PRIMARY KEY (package_id, path)
);
CREATE INDEX files_packages ON files (package_id);
CREATE INDEX files_path ON files (path);
";

pub const TABLES: [&str; 3] = ["packages", "deps", "files"];
pub const INDEXES: [&str; 4] = ["deps_origin", "deps_package", "files_packages", "files_path"];

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar metadata fields of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageField {
    Origin,
    Name,
    Version,
    Comment,
    Description,
    Architecture,
    OsVersion,
    Maintainer,
    Www,
}

impl PackageField {
    pub const ALL: [PackageField; 9] = [
        PackageField::Origin,
        PackageField::Name,
        PackageField::Version,
        PackageField::Comment,
        PackageField::Description,
        PackageField::Architecture,
        PackageField::OsVersion,
        PackageField::Maintainer,
        PackageField::Www,
    ];

    /// Key of the field in a package manifest.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            PackageField::Origin => "origin",
            PackageField::Name => "name",
            PackageField::Version => "version",
            PackageField::Comment => "comment",
            PackageField::Description => "desc",
            PackageField::Architecture => "arch",
            PackageField::OsVersion => "osversion",
            PackageField::Maintainer => "maintainer",
            PackageField::Www => "www",
        }
    }
}

impl fmt::Display for PackageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// A dependency declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStub {
    /// Origin of the depended-upon package.
    pub origin: String,
    pub name: Option<String>,
    pub version: Option<String>,
}

/// A file installed by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStub {
    pub path: String,
    #[serde(default)]
    pub size: i64,
}

/// A parsed package archive.
///
/// `deps` and `files` keep the manifest's distinction between an absent list (`None`) and an
/// empty one (`Some(vec![])`). Both contribute no rows to a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageArchive {
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
    pub deps: Option<Vec<DependencyStub>>,
    pub files: Option<Vec<FileStub>>,
}

impl PackageArchive {
    /// Returns the value of a scalar metadata field, if present.
    pub fn get(&self, field: PackageField) -> Option<&str> {
        match field {
            PackageField::Origin => Some(self.origin.as_str()),
            PackageField::Name => self.name.as_deref(),
            PackageField::Version => self.version.as_deref(),
            PackageField::Comment => self.comment.as_deref(),
            PackageField::Description => self.description.as_deref(),
            PackageField::Architecture => self.arch.as_deref(),
            PackageField::OsVersion => self.osversion.as_deref(),
            PackageField::Maintainer => self.maintainer.as_deref(),
            PackageField::Www => self.www.as_deref(),
        }
    }

    /// Declared dependencies in manifest order; empty when absent.
    pub fn dependencies(&self) -> &[DependencyStub] {
        self.deps.as_deref().unwrap_or_default()
    }

    /// Installed files in manifest order; empty when absent.
    pub fn files(&self) -> &[FileStub] {
        self.files.as_deref().unwrap_or_default()
    }

    /// `name-version`, falling back to the origin when either is missing.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => format!("{name}-{version}"),
            _ => self.origin.clone(),
        }
    }
}

use std::path::Path;

use serde::Deserialize;

use crate::{
    archive::{DependencyStub, FileStub, PackageArchive},
    error::{PackageError, Result},
};

/// Name of the manifest entry at the root of a package archive.
pub const MANIFEST_NAME: &str = "+MANIFEST";

/// On-disk shape of `+MANIFEST`. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct Manifest {
    origin: Option<String>,
    name: Option<String>,
    version: Option<String>,
    comment: Option<String>,
    desc: Option<String>,
    arch: Option<String>,
    osversion: Option<String>,
    maintainer: Option<String>,
    www: Option<String>,
    format_version: Option<i64>,
    deps: Option<Vec<DependencyStub>>,
    files: Option<Vec<FileStub>>,
}

/// Parses manifest text read from the archive at `path`.
pub fn parse_manifest(path: &Path, content: &str) -> Result<PackageArchive> {
    let manifest: Manifest = serde_json::from_str(content).map_err(|err| {
        PackageError::InvalidManifest {
            path: path.to_path_buf(),
            source: err,
        }
    })?;

    let origin = manifest
        .origin
        .filter(|origin| !origin.is_empty())
        .ok_or_else(|| {
            PackageError::MissingField {
                path: path.to_path_buf(),
                field: "origin",
            }
        })?;

    Ok(PackageArchive {
        origin,
        name: manifest.name,
        version: manifest.version,
        comment: manifest.comment,
        description: manifest.desc,
        arch: manifest.arch,
        osversion: manifest.osversion,
        maintainer: manifest.maintainer,
        www: manifest.www,
        format_version: manifest.format_version,
        deps: manifest.deps,
        files: manifest.files,
    })
}

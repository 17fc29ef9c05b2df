use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::{Component, Path},
};

use tracing::trace;

use crate::{
    archive::PackageArchive,
    compression::Compression,
    error::{ErrorContext, PackageError, Result},
    manifest::{parse_manifest, MANIFEST_NAME},
};

/// Opens package archives.
///
/// Implementations must not panic on corrupt input: any archive that cannot be turned into a
/// [`PackageArchive`] is reported as a [`PackageError`].
pub trait PackageReader {
    fn open(&self, path: &Path) -> Result<PackageArchive>;
}

impl<F> PackageReader for F
where
    F: Fn(&Path) -> Result<PackageArchive>,
{
    fn open(&self, path: &Path) -> Result<PackageArchive> {
        self(path)
    }
}

/// Reads `+MANIFEST` out of plain, gzip, bzip2 or xz compressed tarballs.
///
/// The decoder is chosen from the file's magic bytes, not from its suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarballReader;

impl PackageReader for TarballReader {
    fn open(&self, path: &Path) -> Result<PackageArchive> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let head = reader
            .fill_buf()
            .with_context(|| format!("reading {}", path.display()))?;
        let compression = Compression::from_magic_bytes(head);
        trace!(path = %path.display(), ?compression, "opening package archive");

        let archive_err = |source: io::Error| {
            PackageError::Archive {
                path: path.to_path_buf(),
                source,
            }
        };

        let mut archive = tar::Archive::new(compression.decoder(reader));
        for entry in archive.entries().map_err(archive_err)? {
            let mut entry = entry.map_err(archive_err)?;
            let found = is_manifest(&entry.path().map_err(archive_err)?);
            if !found {
                continue;
            }

            let mut content = String::new();
            entry.read_to_string(&mut content).map_err(archive_err)?;
            return parse_manifest(path, &content);
        }

        Err(PackageError::MissingManifest {
            path: path.to_path_buf(),
            name: MANIFEST_NAME,
        })
    }
}

fn is_manifest(path: &Path) -> bool {
    let mut components = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir | Component::RootDir));

    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == MANIFEST_NAME
    )
}

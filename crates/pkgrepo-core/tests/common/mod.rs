#![allow(dead_code)]

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde_json::{json, Value};

/// Compression applied to a fixture archive.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    Tar,
    Gzip,
    Bzip2,
    Xz,
}

/// A package manifest under construction.
pub struct Fixture {
    manifest: Value,
}

impl Fixture {
    /// A package with every scalar field populated and no dependency or file lists.
    pub fn new(origin: &str) -> Self {
        let name = origin.rsplit('/').next().unwrap_or(origin);
        Self {
            manifest: json!({
                "origin": origin,
                "name": name,
                "version": "1.0.0",
                "comment": format!("{name} comment"),
                "desc": format!("{name} description"),
                "arch": "freebsd:14:x86:64",
                "osversion": "1400097",
                "maintainer": "ports@example.org",
                "www": format!("https://example.org/{name}"),
                "format_version": 2,
            }),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.manifest["version"] = json!(version);
        self
    }

    pub fn deps(mut self, deps: &[(&str, &str, &str)]) -> Self {
        self.manifest["deps"] = deps
            .iter()
            .map(|(origin, name, version)| {
                json!({"origin": origin, "name": name, "version": version})
            })
            .collect();
        self
    }

    /// Sets the `deps` list verbatim, for entries with missing keys.
    pub fn dependency_values(mut self, deps: Value) -> Self {
        self.manifest["deps"] = deps;
        self
    }

    pub fn files(mut self, files: &[(&str, i64)]) -> Self {
        self.manifest["files"] = files
            .iter()
            .map(|(path, size)| json!({"path": path, "size": size}))
            .collect();
        self
    }

    /// Writes the package as `root/relative` and returns the path.
    pub fn write(&self, root: &Path, relative: &str, codec: Codec) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let manifest = serde_json::to_vec_pretty(&self.manifest).unwrap();
        fs::write(&path, encode(&tarball(&manifest), codec)).unwrap();
        path
    }
}

fn tarball(manifest: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    let mut header = tar::Header::new_gnu();
    header.set_size(manifest.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "+MANIFEST", manifest)
        .unwrap();

    let payload = b"payload";
    let mut header = tar::Header::new_gnu();
    header.set_size(payload.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, "usr/local/bin/tool", &payload[..])
        .unwrap();

    builder.into_inner().unwrap()
}

fn encode(tar: &[u8], codec: Codec) -> Vec<u8> {
    match codec {
        Codec::Tar => tar.to_vec(),
        Codec::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Bzip2 => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
    }
}

/// Writes bytes that no reader accepts as a package.
pub fn write_corrupt(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"\x1f\x8bthis is not a gzip stream").unwrap();
    path
}

use std::io::Read;

use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use xz2::read::XzDecoder;

const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Compression wrapped around a package tarball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl Compression {
    /// Detect compression format from magic bytes.
    ///
    /// Returns `None` variant if no magic bytes match or if the input
    /// is too short to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&BZIP2_MAGIC) {
            return Compression::Bzip2;
        }
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        if bytes.starts_with(&XZ_MAGIC) {
            return Compression::Xz;
        }
        Compression::None
    }

    /// Wraps `reader` in the matching decoder.
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Compression::None => Box::new(reader),
            Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(BzDecoder::new(reader)),
            Compression::Xz => Box::new(XzDecoder::new(reader)),
        }
    }
}

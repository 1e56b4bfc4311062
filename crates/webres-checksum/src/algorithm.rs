//! Supported digest algorithms.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

use crate::ChecksumError;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms usable for local file verification.
///
/// Names follow the spelling used in existing catalog data
/// (`sha256`, `sha512/256`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

/// Algorithms browsers accept in an `integrity` attribute.
pub const INTEGRITY_ALGORITHMS: &[Algorithm] =
    &[Algorithm::Sha256, Algorithm::Sha384, Algorithm::Sha512];

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: &'static [Algorithm] = &[
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha512_224,
        Algorithm::Sha512_256,
    ];

    /// Catalog name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha512_224 => "sha512/224",
            Algorithm::Sha512_256 => "sha512/256",
        }
    }

    /// Look up an algorithm by its catalog name. Names are case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }

    /// Whether browsers recognize this algorithm for Subresource Integrity.
    pub fn is_integrity_algorithm(&self) -> bool {
        INTEGRITY_ALGORITHMS.contains(self)
    }

    /// Digest an in-memory buffer.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Md5 => Md5::digest(data).to_vec(),
            Algorithm::Sha1 => Sha1::digest(data).to_vec(),
            Algorithm::Sha224 => Sha224::digest(data).to_vec(),
            Algorithm::Sha256 => Sha256::digest(data).to_vec(),
            Algorithm::Sha384 => Sha384::digest(data).to_vec(),
            Algorithm::Sha512 => Sha512::digest(data).to_vec(),
            Algorithm::Sha512_224 => Sha512_224::digest(data).to_vec(),
            Algorithm::Sha512_256 => Sha512_256::digest(data).to_vec(),
        }
    }

    /// Digest everything a reader yields, in bounded chunks.
    pub fn digest_reader<R: Read>(&self, reader: R) -> io::Result<Vec<u8>> {
        match self {
            Algorithm::Md5 => stream::<Md5, _>(reader),
            Algorithm::Sha1 => stream::<Sha1, _>(reader),
            Algorithm::Sha224 => stream::<Sha224, _>(reader),
            Algorithm::Sha256 => stream::<Sha256, _>(reader),
            Algorithm::Sha384 => stream::<Sha384, _>(reader),
            Algorithm::Sha512 => stream::<Sha512, _>(reader),
            Algorithm::Sha512_224 => stream::<Sha512_224, _>(reader),
            Algorithm::Sha512_256 => stream::<Sha512_256, _>(reader),
        }
    }

    /// Digest the full contents of a file.
    pub fn digest_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        self.digest_reader(file)
    }
}

fn stream<D: Digest, R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ChecksumError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = ChecksumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.name().to_string()
    }
}

//! Local file integrity verification
//!
//! Recomputes the digest of a descriptor's file with the algorithm named in
//! its checksum and compares it with the configured digest. The outcome is
//! three-valued: a file that could not be checked is [`Verification::Indeterminate`],
//! which callers must never treat as a pass.
//!
//! Nothing is cached. Every call re-reads the file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use webres_checksum::{Checksum, ChecksumError};

use crate::resource::ResourceDescriptor;

/// Why a verification could not be performed.
#[derive(Debug, thiserror::Error)]
pub enum IndeterminateReason {
    #[error("no file path configured")]
    NoFilePath,

    #[error("no checksum configured")]
    NoChecksum,

    #[error("file not found: {0}")]
    FileMissing(PathBuf),

    #[error("checksum unusable: {0}")]
    Checksum(#[source] ChecksumError),

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of checking a file against its checksum.
#[derive(Debug)]
pub enum Verification {
    /// The file digest equals the configured digest.
    Verified,
    /// The file was hashed and the digest differs.
    NotVerified,
    /// No verification was possible.
    Indeterminate(IndeterminateReason),
}

impl Verification {
    /// Only a positive verification is trusted.
    pub fn is_trusted(&self) -> bool {
        matches!(self, Verification::Verified)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Verification::Indeterminate(_))
    }

    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            Verification::Verified => "verified",
            Verification::NotVerified => "not-verified",
            Verification::Indeterminate(_) => "indeterminate",
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Indeterminate(reason) => write!(f, "indeterminate: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Verify a descriptor's local file against its checksum.
pub fn verify(descriptor: &ResourceDescriptor) -> Verification {
    let Some(path) = descriptor.filepath() else {
        return Verification::Indeterminate(IndeterminateReason::NoFilePath);
    };
    let Some(checksum) = descriptor.checksum() else {
        return Verification::Indeterminate(IndeterminateReason::NoChecksum);
    };
    verify_file(path, checksum)
}

/// Verify `path` against an `algorithm:digest` string.
pub fn verify_file(path: &Path, checksum: &str) -> Verification {
    if !path.exists() {
        return Verification::Indeterminate(IndeterminateReason::FileMissing(path.to_path_buf()));
    }
    let expected = match Checksum::parse(checksum) {
        Ok(c) => c,
        Err(e) => return Verification::Indeterminate(IndeterminateReason::Checksum(e)),
    };
    match expected.algorithm().digest_file(path) {
        Ok(actual) => compare(&expected, &actual),
        Err(source) => Verification::Indeterminate(IndeterminateReason::Unreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Verify bytes already read from a descriptor's file.
///
/// Used when the same bytes are about to be sent somewhere, so that what is
/// checked is exactly what is delivered.
pub fn verify_contents(descriptor: &ResourceDescriptor, contents: &[u8]) -> Verification {
    let Some(checksum) = descriptor.checksum() else {
        return Verification::Indeterminate(IndeterminateReason::NoChecksum);
    };
    match Checksum::parse(checksum) {
        Ok(expected) => compare(&expected, &expected.algorithm().digest(contents)),
        Err(e) => Verification::Indeterminate(IndeterminateReason::Checksum(e)),
    }
}

fn compare(expected: &Checksum, actual: &[u8]) -> Verification {
    if expected.matches(actual) {
        Verification::Verified
    } else {
        Verification::NotVerified
    }
}

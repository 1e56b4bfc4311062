//! Error types for checksum parsing and digest computation.

use std::io;

/// Errors produced while parsing or computing checksums.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// The string has no `:` between algorithm and digest.
    #[error("checksum has no ':' separator: {0}")]
    MissingSeparator(String),

    /// The algorithm name is not one this build can compute.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The digest does not decode in the detected encoding.
    #[error("{encoding} digest does not decode: {reason}")]
    InvalidDigest {
        encoding: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

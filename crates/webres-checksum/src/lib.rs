//! Checksum codec for webres.
//!
//! Parses the `algorithm:digest` strings stored in resource catalogs,
//! decodes the digest (hex or base64) and computes file digests for every
//! supported algorithm.

mod algorithm;
mod checksum;
mod encoding;
mod error;

pub use algorithm::{Algorithm, INTEGRITY_ALGORITHMS};
pub use checksum::Checksum;
pub use encoding::DigestEncoding;
pub use error::ChecksumError;

/// Separator between the algorithm name and the encoded digest.
pub const SEPARATOR: char = ':';

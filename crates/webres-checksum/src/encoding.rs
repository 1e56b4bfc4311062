//! Digest encodings and the hex-vs-base64 detection heuristic.
//!
//! Catalog checksums do not say how the digest is encoded. A digest made only
//! of hex digits is read as hex, anything else as base64. This keeps existing
//! catalog data working, but a base64 digest that happens to use only
//! `[0-9a-fA-F]` characters is misread as hex. Such a digest then fails to
//! match the file and verification reports a mismatch rather than passing.
//!
//! Detection also records hex letter case and base64 padding so that
//! [`DigestEncoding::encode`] writes a digest back the way it was read.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, STANDARD, STANDARD_NO_PAD,
};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::ChecksumError;

/// Standard alphabet, accepting input with or without `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How a digest is written in a checksum string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEncoding {
    /// Lowercase (or mixed case) hex.
    Hex,
    /// Uppercase hex.
    HexUpper,
    /// Standard base64 with `=` padding.
    Base64,
    /// Standard base64 with the padding left off.
    Base64Unpadded,
}

impl DigestEncoding {
    /// Guess the encoding from the characters of `digest`.
    pub fn detect(digest: &str) -> Self {
        if !digest.is_empty() && digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            let upper = digest.bytes().any(|b| b.is_ascii_uppercase());
            let lower = digest.bytes().any(|b| b.is_ascii_lowercase());
            if upper && !lower {
                DigestEncoding::HexUpper
            } else {
                DigestEncoding::Hex
            }
        } else if digest.len() % 4 != 0 && !digest.ends_with('=') {
            DigestEncoding::Base64Unpadded
        } else {
            DigestEncoding::Base64
        }
    }

    /// Base name, `hex` or `base64`.
    pub fn base(&self) -> &'static str {
        match self {
            DigestEncoding::Hex | DigestEncoding::HexUpper => "hex",
            DigestEncoding::Base64 | DigestEncoding::Base64Unpadded => "base64",
        }
    }

    /// Decode `digest` to raw bytes. Hex accepts either case, base64 either
    /// padding.
    pub fn decode(&self, digest: &str) -> Result<Vec<u8>, ChecksumError> {
        let decoded = match self {
            DigestEncoding::Hex | DigestEncoding::HexUpper => {
                hex::decode(digest).map_err(|e| e.to_string())
            }
            DigestEncoding::Base64 | DigestEncoding::Base64Unpadded => {
                LENIENT_BASE64.decode(digest).map_err(|e| e.to_string())
            }
        };
        decoded.map_err(|reason| ChecksumError::InvalidDigest {
            encoding: self.base(),
            reason,
        })
    }

    /// Encode raw bytes in this style.
    pub fn encode(&self, raw: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(raw),
            DigestEncoding::HexUpper => hex::encode_upper(raw),
            DigestEncoding::Base64 => STANDARD.encode(raw),
            DigestEncoding::Base64Unpadded => STANDARD_NO_PAD.encode(raw),
        }
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestEncoding::Hex => write!(f, "hex"),
            DigestEncoding::HexUpper => write!(f, "hex (upper case)"),
            DigestEncoding::Base64 => write!(f, "base64"),
            DigestEncoding::Base64Unpadded => write!(f, "base64 (unpadded)"),
        }
    }
}

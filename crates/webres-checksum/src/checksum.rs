//! Parsed `algorithm:digest` checksums.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Algorithm, ChecksumError, DigestEncoding, SEPARATOR};

/// A checksum with its digest decoded to raw bytes.
///
/// The digest text is kept as read, so a parsed checksum displays exactly
/// as its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: Algorithm,
    digest: Vec<u8>,
    encoding: DigestEncoding,
    encoded: String,
}

impl Checksum {
    /// Build a checksum from an already computed raw digest.
    pub fn new(algorithm: Algorithm, digest: Vec<u8>, encoding: DigestEncoding) -> Self {
        let encoded = encoding.encode(&digest);
        Self {
            algorithm,
            digest,
            encoding,
            encoded,
        }
    }

    /// Parse `algorithm:digest`.
    ///
    /// Splits on the first `:` only. The digest encoding is detected from its
    /// characters (see [`DigestEncoding::detect`]).
    pub fn parse(s: &str) -> Result<Self, ChecksumError> {
        let (name, encoded) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| ChecksumError::MissingSeparator(s.to_string()))?;
        let algorithm: Algorithm = name.parse()?;
        let encoding = DigestEncoding::detect(encoded);
        let digest = encoding.decode(encoded)?;
        Ok(Self {
            algorithm,
            digest,
            encoding,
            encoded: encoded.to_string(),
        })
    }

    /// Compute a fresh checksum for a file.
    pub fn for_file(
        algorithm: Algorithm,
        path: &Path,
        encoding: DigestEncoding,
    ) -> Result<Self, ChecksumError> {
        let digest = algorithm.digest_file(path)?;
        Ok(Self::new(algorithm, digest, encoding))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Encoding the digest was written in.
    pub fn encoding(&self) -> DigestEncoding {
        self.encoding
    }

    /// Digest text as parsed, or as encoded by [`Checksum::new`].
    pub fn encoded_digest(&self) -> &str {
        &self.encoded
    }

    /// Whether `digest` equals the expected digest byte for byte.
    pub fn matches(&self, digest: &[u8]) -> bool {
        self.digest == digest
    }

    /// Subresource Integrity form `algorithm-base64digest`.
    ///
    /// Returns `None` for algorithms browsers do not accept.
    pub fn to_sri(&self) -> Option<String> {
        if !self.algorithm.is_integrity_algorithm() {
            return None;
        }
        Some(format!(
            "{}-{}",
            self.algorithm.name(),
            STANDARD.encode(&self.digest)
        ))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.algorithm.name(),
            SEPARATOR,
            self.encoded_digest()
        )
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn test_parse_hex() {
        let c = Checksum::parse(&format!("sha256:{}", HELLO_SHA256)).unwrap();
        assert_eq!(c.algorithm(), Algorithm::Sha256);
        assert_eq!(c.encoding(), DigestEncoding::Hex);
        assert_eq!(c.digest().len(), 32);
        assert!(c.matches(&Algorithm::Sha256.digest(b"hello\n")));
    }

    #[test]
    fn test_parse_base64() {
        let raw = Algorithm::Sha384.digest(b"body { color: red }");
        let c = Checksum::parse(&format!("sha384:{}", STANDARD.encode(&raw))).unwrap();
        assert_eq!(c.encoding(), DigestEncoding::Base64);
        assert_eq!(c.digest(), raw.as_slice());
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        // The digest part keeps any further colons and then fails to decode.
        let err = Checksum::parse("sha256:ab:cd").unwrap_err();
        assert!(matches!(err, ChecksumError::InvalidDigest { encoding: "base64", .. }));
    }

    #[test]
    fn test_parse_missing_separator() {
        assert!(matches!(
            Checksum::parse("sha256"),
            Err(ChecksumError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_parse_unsupported_algorithm() {
        let err = Checksum::parse("gost:00ff").unwrap_err();
        assert!(matches!(err, ChecksumError::UnsupportedAlgorithm(ref n) if n == "gost"));
    }

    #[test]
    fn test_round_trip_preserves_string() {
        let raw = Algorithm::Sha512.digest(b"x");
        for s in [
            format!("sha512:{}", hex::encode(&raw)),
            format!("sha512:{}", STANDARD.encode(&raw)),
            format!("md5:{}", hex::encode(Algorithm::Md5.digest(b"x"))),
        ] {
            assert_eq!(Checksum::parse(&s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_uppercase_hex_and_unpadded_base64_round_trip() {
        let raw = Algorithm::Sha256.digest(b"x");
        let unpadded = STANDARD.encode(&raw).trim_end_matches('=').to_string();
        for (digest, encoding) in [
            (hex::encode_upper(&raw), DigestEncoding::HexUpper),
            (unpadded, DigestEncoding::Base64Unpadded),
        ] {
            let c = Checksum::parse(&format!("sha256:{}", digest)).unwrap();
            assert_eq!(c.encoding(), encoding);
            assert_eq!(c.digest(), raw.as_slice());
            assert_eq!(c.encoding().encode(c.digest()), digest);
            assert_eq!(c.encoded_digest(), digest);
            assert_eq!(c.to_string(), format!("sha256:{}", digest));
        }
    }

    #[test]
    fn test_mixed_case_hex_displays_as_read() {
        let s = "md5:D41d8CD98f00B204e9800998ECF8427e";
        let c = Checksum::parse(s).unwrap();
        assert_eq!(c.encoding(), DigestEncoding::Hex);
        assert_eq!(c.to_string(), s);
        assert!(c.matches(&Algorithm::Md5.digest(b"")));
    }

    #[test]
    fn test_sri_only_for_integrity_algorithms() {
        let md5 = Checksum::new(Algorithm::Md5, Algorithm::Md5.digest(b"a"), DigestEncoding::Hex);
        assert!(md5.to_sri().is_none());

        let sha = Checksum::new(
            Algorithm::Sha256,
            Algorithm::Sha256.digest(b""),
            DigestEncoding::Hex,
        );
        assert_eq!(
            sha.to_sri().unwrap(),
            "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_for_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();

        let c = Checksum::for_file(Algorithm::Sha256, f.path(), DigestEncoding::Hex).unwrap();
        assert_eq!(c.to_string(), format!("sha256:{}", HELLO_SHA256));
    }

    #[test]
    fn test_for_missing_file_is_io_error() {
        let err = Checksum::for_file(
            Algorithm::Sha1,
            Path::new("/nonexistent/webres/file.js"),
            DigestEncoding::Hex,
        )
        .unwrap_err();
        assert!(matches!(err, ChecksumError::Io(_)));
    }
}

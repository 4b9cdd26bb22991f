//! Salted digest preparation for presented credentials

use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Digest algorithms accepted in stored credential records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl HashAlgorithm {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Sha512_224 => "SHA-512/224",
            Self::Sha512_256 => "SHA-512/256",
        }
    }

    /// Lowercase hex digest of `input`
    #[must_use]
    pub fn digest_hex(&self, input: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(input)),
            Self::Sha1 => hex::encode(Sha1::digest(input)),
            Self::Sha224 => hex::encode(Sha224::digest(input)),
            Self::Sha256 => hex::encode(Sha256::digest(input)),
            Self::Sha384 => hex::encode(Sha384::digest(input)),
            Self::Sha512 => hex::encode(Sha512::digest(input)),
            Self::Sha512_224 => hex::encode(Sha512_224::digest(input)),
            Self::Sha512_256 => hex::encode(Sha512_256::digest(input)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    /// Parse a digest name as spelled by Java security providers.
    ///
    /// Names are case-insensitive; the hyphen after `SHA` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA" | "SHA1" | "SHA-1" => Ok(Self::Sha1),
            "SHA224" | "SHA-224" => Ok(Self::Sha224),
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA384" | "SHA-384" => Ok(Self::Sha384),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            "SHA512/224" | "SHA-512/224" => Ok(Self::Sha512_224),
            "SHA512/256" | "SHA-512/256" => Ok(Self::Sha512_256),
            _ => Err(HashError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transform a presented credential into its stored representation.
///
/// Without an algorithm the raw value is returned unchanged and the salt is
/// ignored. With one, the salt is appended to the raw value and the digest of
/// the UTF-8 bytes is returned as lowercase hex.
pub fn prepare(raw: &str, salt: Option<&str>, algorithm: Option<&str>) -> Result<String, HashError> {
    let Some(algorithm) = algorithm.filter(|a| !a.is_empty()) else {
        return Ok(raw.to_string());
    };

    let algorithm: HashAlgorithm = algorithm.parse()?;

    let mut input = Vec::with_capacity(raw.len() + salt.map_or(0, str::len));
    input.extend_from_slice(raw.as_bytes());
    if let Some(salt) = salt {
        input.extend_from_slice(salt.as_bytes());
    }

    Ok(algorithm.digest_hex(&input))
}

/// Constant-time comparison of a prepared credential against a stored value
#[must_use]
pub fn matches(prepared: &str, stored: &str) -> bool {
    prepared.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELCOME1_NACL_SHA256: &str =
        "70a5b4215270a19492788cf76c9e591a9334ac2363213765674e5181babbea1b";
    const NOTWELCOME_NACL_SHA256: &str =
        "821601607e40e19ef631ea9ead073f4a10175fb465725a8e6b99ca03f5ce5805";

    #[test]
    fn test_no_algorithm_returns_raw() {
        assert_eq!(prepare("welcome1", None, None).unwrap(), "welcome1");
        assert_eq!(prepare("welcome1", Some("NaCl"), None).unwrap(), "welcome1");
        assert_eq!(prepare("welcome1", None, Some("")).unwrap(), "welcome1");
    }

    #[test]
    fn test_salt_is_appended_before_hashing() {
        let prepared = prepare("welcome1", Some("NaCl"), Some("SHA-256")).unwrap();
        assert_eq!(prepared, WELCOME1_NACL_SHA256);

        let prepared = prepare("notwelcome", Some("NaCl"), Some("SHA-256")).unwrap();
        assert_eq!(prepared, NOTWELCOME_NACL_SHA256);
    }

    #[test]
    fn test_salt_position_matters() {
        let appended = prepare("welcome1", Some("NaCl"), Some("SHA-256")).unwrap();
        let prepended = prepare("NaClwelcome1", None, Some("SHA-256")).unwrap();
        assert_ne!(appended, prepended);
    }

    #[test]
    fn test_unsalted_digest() {
        let prepared = prepare("abc", None, Some("SHA-256")).unwrap();
        assert_eq!(
            prepared,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let prepared = prepare("welcome1", None, Some("SHA-512")).unwrap();
        assert_eq!(prepared.len(), 128);
        assert!(prepared.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_known_vectors() {
        let cases = [
            ("MD5", "900150983cd24fb0d6963f7d28e17f72"),
            ("SHA-1", "a9993e364706816aba3e25717850c26c9cd0d89d"),
            (
                "SHA-224",
                "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7",
            ),
            (
                "SHA-384",
                "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded163\
                 1a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7",
            ),
            (
                "SHA-512/224",
                "4634270f707b6a54daae7530460842e20e37ed265ceee9a43e8924aa",
            ),
            (
                "SHA-512/256",
                "53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23",
            ),
        ];

        for (algorithm, expected) in cases {
            let prepared = prepare("abc", None, Some(algorithm)).unwrap();
            assert_eq!(prepared, expected, "{algorithm}");
        }
    }

    #[test]
    fn test_salted_sha1() {
        // "ab" salted with "c" hashes the same bytes as "abc"
        let prepared = prepare("ab", Some("c"), Some("SHA-1")).unwrap();
        assert_eq!(prepared, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA-224".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha224);
        assert_eq!("SHA-512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("SHA".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!("sha-1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!(
            "SHA-512/256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha512_256
        );
        assert_eq!(
            "sha512/224".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha512_224
        );
        assert_eq!(HashAlgorithm::Sha256.to_string(), "SHA-256");
        assert_eq!(HashAlgorithm::Sha512_256.to_string(), "SHA-512/256");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let all = [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha224,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
            HashAlgorithm::Sha512_224,
            HashAlgorithm::Sha512_256,
        ];
        for algorithm in all {
            assert_eq!(algorithm.as_str().parse::<HashAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unsupported_algorithm() {
        let err = prepare("welcome1", None, Some("SHA3-256")).unwrap_err();
        assert_eq!(err, HashError::UnsupportedAlgorithm("SHA3-256".to_string()));
        assert!(err.to_string().contains("SHA3-256"));

        // Separators other than the hyphen are not accepted
        assert!("Sha_384".parse::<HashAlgorithm>().is_err());
        assert!("SHA 256".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_matches() {
        assert!(matches("welcome1", "welcome1"));
        assert!(!matches("welcome1", "welcome2"));
        assert!(!matches("welcome1", "welcome"));
        assert!(!matches("", "welcome1"));
    }
}

//! Identification of analyzed binaries.
//!
//! A private data value is only meaningful together with the build it came from. When a
//! checksum is not recognized, the digests printed next to it identify the binary exactly.

use std::fmt;

use md5::Md5;
use sha1::{Digest, Sha1};

/// Size and content digests of a binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Length in bytes
    pub size: usize,
    /// Lowercase hex MD5 digest
    pub md5: String,
    /// Lowercase hex SHA-1 digest
    pub sha1: String,
}

impl Fingerprint {
    /// Computes the fingerprint of `data`.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        let mut md5 = Md5::new();
        md5.update(data);

        let mut sha1 = Sha1::new();
        sha1.update(data);

        Fingerprint {
            size: data.len(),
            md5: hex::encode(md5.finalize()),
            sha1: hex::encode(sha1.finalize()),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, md5 {}, sha1 {}", self.size, self.md5, self.sha1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        let fp = Fingerprint::of(b"abc");
        assert_eq!(fp.size, 3);
        assert_eq!(fp.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(fp.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn empty_input() {
        let fp = Fingerprint::of(&[]);
        assert_eq!(fp.size, 0);
        assert_eq!(fp.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(fp.sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn display() {
        let fp = Fingerprint::of(b"abc");
        assert_eq!(
            fp.to_string(),
            "3 bytes, md5 900150983cd24fb0d6963f7d28e17f72, sha1 a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}

//! Checksum validation of reconstructed private data.
//!
//! The private data differs between the Steam and the NVIDIA builds of the capture library.
//! Both known values are identified by their CRC-32; anything else is reported, not rejected.

use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use crate::extract::SecretBytes;

/// A build whose private data checksum is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum KnownBuild {
    /// GeForce Experience as distributed through Steam
    Steam,
    /// GeForce Experience as distributed by NVIDIA
    #[strum(serialize = "NVIDIA")]
    Nvidia,
}

impl KnownBuild {
    /// CRC-32 of this build's private data.
    #[must_use]
    pub const fn checksum(self) -> u32 {
        match self {
            KnownBuild::Steam => 0x85AC_72FB,
            KnownBuild::Nvidia => 0x3806_C005,
        }
    }

    /// Looks up the build a checksum belongs to.
    #[must_use]
    pub fn from_checksum(checksum: u32) -> Option<KnownBuild> {
        KnownBuild::iter().find(|build| build.checksum() == checksum)
    }
}

/// CRC-32 (IEEE 802.3, as used by zlib) of `bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Outcome of checking reconstructed bytes against the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationResult {
    /// The reconstructed private data
    pub bytes: SecretBytes,
    /// CRC-32 of `bytes`
    pub checksum: u32,
    /// Whether `checksum` is on the allow-list
    pub recognized: bool,
    /// The built-in entry that matched, `None` for unknown or user-supplied checksums
    pub build: Option<KnownBuild>,
}

/// Classifies private data by checksum.
///
/// The built-in [`KnownBuild`] checksums are always accepted; [`Validator::with_checksums`]
/// adds more on top of them.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    extra: Vec<u32>,
}

impl Validator {
    /// A validator that accepts only the built-in checksums.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator that additionally accepts `extra`.
    #[must_use]
    pub fn with_checksums(extra: &[u32]) -> Self {
        Validator {
            extra: extra.to_vec(),
        }
    }

    /// Returns `true` if `checksum` is built-in or was added to this validator.
    #[must_use]
    pub fn accepts(&self, checksum: u32) -> bool {
        KnownBuild::from_checksum(checksum).is_some() || self.extra.contains(&checksum)
    }

    /// Checksums `bytes` and checks the result against the allow-list.
    #[must_use]
    pub fn validate(&self, bytes: SecretBytes) -> ValidationResult {
        let checksum = checksum(bytes.as_bytes());
        let build = KnownBuild::from_checksum(checksum);
        let recognized = build.is_some() || self.extra.contains(&checksum);

        if recognized {
            log::debug!("checksum 0x{checksum:08x} recognized");
        } else {
            log::debug!("checksum 0x{checksum:08x} is not on the allow-list");
        }

        ValidationResult {
            bytes,
            checksum,
            recognized,
            build,
        }
    }
}

/// Validates `bytes` against the built-in checksums only.
#[must_use]
pub fn validate(bytes: SecretBytes) -> ValidationResult {
    Validator::new().validate(bytes)
}

//! Reassembly of the private data from the trailing window.

use std::fmt;

use crate::{
    analysis::DecodedInstruction,
    extract::idiom::{data_store, CHUNK_COUNT, CHUNK_SIZE, CHUNK_STRIDE, SECRET_LEN},
};

/// The 16 byte private data, possibly only partially filled.
///
/// Chunks are written front to back, so a buffer with `chunks() == 2` holds meaningful data in
/// its first eight bytes and zeros after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SecretBytes {
    bytes: [u8; SECRET_LEN],
    chunks: usize,
}

impl SecretBytes {
    /// Wraps a complete 16 byte value.
    #[must_use]
    pub fn new(bytes: [u8; SECRET_LEN]) -> Self {
        SecretBytes {
            bytes,
            chunks: CHUNK_COUNT,
        }
    }

    /// The raw bytes, zero padded past the accepted chunks.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.bytes
    }

    /// Number of accepted 4-byte chunks.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Returns `true` once all four chunks are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.chunks == CHUNK_COUNT
    }

    /// Lowercase hex rendering without separators.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    fn accept(&mut self, chunk: u32) {
        let start = self.chunks * CHUNK_SIZE;
        self.bytes[start..start + CHUNK_SIZE].copy_from_slice(&chunk.to_be_bytes());
        self.chunks += 1;
    }
}

impl fmt::Display for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Replays `window` oldest first and collects the data stores.
///
/// A store is accepted when it is the first one seen, or when its displacement is exactly four
/// past the previously accepted store. Accepted immediates are written big-endian in acceptance
/// order. Collection stops as soon as four chunks are present.
///
/// This never fails; check [`SecretBytes::is_complete`] on the result.
#[must_use]
pub fn reconstruct<'a, I>(window: I) -> SecretBytes
where
    I: IntoIterator<Item = &'a DecodedInstruction>,
{
    let mut secret = SecretBytes::default();
    let mut baseline: Option<i64> = None;

    for instr in window {
        let Some((displacement, chunk)) = data_store(instr) else {
            continue;
        };

        let contiguous = match baseline {
            None => true,
            Some(previous) => previous.checked_add(CHUNK_STRIDE) == Some(displacement),
        };
        if !contiguous {
            log::trace!(
                "skipping store at 0x{:x}: displacement {displacement:#x} breaks the sequence",
                instr.offset
            );
            continue;
        }

        secret.accept(chunk);
        baseline = Some(displacement);

        if secret.is_complete() {
            break;
        }
    }

    secret
}

//! Storage behind a loaded image.
//!
//! A [`Backend`] only has to hand out its bytes; bounds checked access is derived from that.
//! [`Memory`] owns a buffer (downloaded or extracted images), [`Physical`] maps a file from disk.

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error, Result};

/// Backing storage of a loaded [`crate::File`].
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let data = self.data();
        offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| out_of_bounds_error!())
    }
}

/// Owned image bytes.
#[derive(Debug)]
pub struct Memory(Vec<u8>);

impl Memory {
    /// Takes ownership of `data`.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory(data)
    }
}

impl Backend for Memory {
    fn data(&self) -> &[u8] {
        &self.0
    }
}

/// A read-only mapping of an image on disk.
///
/// The library on disk must not be modified while a scan runs.
#[derive(Debug)]
pub struct Physical {
    map: Mmap,
}

impl Physical {
    /// Maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and
    /// [`crate::Error::Empty`] for a zero-length file, which cannot be mapped portably.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(Error::Empty);
        }

        // SAFETY: the mapping is read-only and lives as long as `Physical`
        let map = unsafe { Mmap::map(&file) }?;
        Ok(Physical { map })
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn memory_slices() {
        let mut data = vec![0xCC_u8; 0x100];
        data[0x10..0x16].copy_from_slice(&[0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF]);
        let memory = Memory::new(data);

        assert_eq!(memory.len(), 0x100);
        assert_eq!(
            memory.data_slice(0x10, 6).unwrap(),
            &[0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(memory.data_slice(0x100, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn slices_out_of_bounds() {
        let memory = Memory::new(vec![0; 0x100]);

        for (offset, len) in [(usize::MAX, 1), (0x100, 1), (0xFF, 2), (0, 0x101)] {
            assert!(
                matches!(memory.data_slice(offset, len), Err(Error::OutOfBounds { .. })),
                "{offset:#x}+{len:#x}"
            );
        }
    }

    #[test]
    fn physical_maps_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"MZ\x90\x00\x03").unwrap();

        let physical = Physical::new(temp.path()).unwrap();
        assert_eq!(physical.len(), 5);
        assert_eq!(physical.data_slice(0, 2).unwrap(), b"MZ");
        assert!(physical.data_slice(4, 2).is_err());
    }

    #[test]
    fn physical_empty_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(Physical::new(temp.path()), Err(Error::Empty)));
    }

    #[test]
    fn physical_missing_file() {
        match Physical::new("/nonexistent/path/to/_nvspcaps64.dll") {
            Err(Error::FileError(error)) => {
                assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected FileError, got {other:?}"),
        }
    }
}

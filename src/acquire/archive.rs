//! Access to entries of the 7z payload.
//!
//! [`SevenZip`] decodes the archive in-process. The trait seam exists so the download chain can
//! be exercised without real archives.

use std::{io::Read, path::Path};

use sevenz_rust::{Password, SevenZReader};

use crate::{Error, Result};

/// Read access to a packed archive.
pub trait ArchiveExtractor: Send + Sync {
    /// Lists the paths of all file entries in `archive`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if the archive cannot be read.
    fn list(&self, archive: &Path) -> Result<Vec<String>>;

    /// Reads the entry stored under `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] if the entry cannot be unpacked.
    fn read_entry(&self, archive: &Path, entry: &str) -> Result<Vec<u8>>;
}

/// Finds the first entry whose final path component is `name`.
///
/// Both `/` and `\` count as separators, archives built on Windows use the latter.
#[must_use]
pub fn find_entry<'a>(entries: &'a [String], name: &str) -> Option<&'a str> {
    entries
        .iter()
        .map(String::as_str)
        .find(|entry| entry.rsplit(['/', '\\']).next() == Some(name))
}

/// Unpacks the entry named `name` (at any depth) from `archive`.
///
/// # Errors
///
/// Returns [`Error::Archive`] if no entry carries that name or unpacking fails.
pub fn extract_named(extractor: &dyn ArchiveExtractor, archive: &Path, name: &str) -> Result<Vec<u8>> {
    let entries = extractor.list(archive)?;
    log::debug!("{} lists {} entries", archive.display(), entries.len());

    let Some(entry) = find_entry(&entries, name) else {
        return Err(Error::Archive(format!(
            "no entry named {name} in {}",
            archive.display()
        )));
    };

    extractor.read_entry(archive, entry)
}

/// [`ArchiveExtractor`] backed by the `sevenz-rust` decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenZip;

impl SevenZip {
    fn open(archive: &Path) -> Result<SevenZReader<std::fs::File>> {
        SevenZReader::open(archive, Password::empty())
            .map_err(|error| Error::Archive(format!("{}: {error}", archive.display())))
    }
}

impl ArchiveExtractor for SevenZip {
    fn list(&self, archive: &Path) -> Result<Vec<String>> {
        let reader = Self::open(archive)?;

        Ok(reader
            .archive()
            .files
            .iter()
            .filter(|entry| !entry.is_directory)
            .map(|entry| entry.name.clone())
            .collect())
    }

    fn read_entry(&self, archive: &Path, entry: &str) -> Result<Vec<u8>> {
        let mut reader = Self::open(archive)?;

        let mut data = None;
        reader
            .for_each_entries(|current, stream| {
                if current.name != entry {
                    return Ok(true);
                }
                let mut buffer = Vec::with_capacity(usize::try_from(current.size).unwrap_or_default());
                stream.read_to_end(&mut buffer)?;
                data = Some(buffer);
                Ok(false)
            })
            .map_err(|error| Error::Archive(format!("{entry}: {error}")))?;

        match data {
            Some(data) if !data.is_empty() => Ok(data),
            Some(_) => Err(Error::Archive(format!("entry {entry} unpacked to nothing"))),
            None => Err(Error::Archive(format!(
                "no entry {entry} in {}",
                archive.display()
            ))),
        }
    }
}

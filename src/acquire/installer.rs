//! Carving of the 7z payload out of the GeForce Experience installer.
//!
//! The installer is a self-extracting executable. Its configuration block is bracketed by
//! `!@Install@!` / `!@InstallEnd@!` markers, and the 7z archive follows the second closing
//! marker after at most a few bytes of padding.

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error, Result};

/// Closing marker of the installer configuration block.
pub const INSTALL_END_MARKER: &[u8] = b"!@InstallEnd@!";

/// Which occurrence of [`INSTALL_END_MARKER`] precedes the archive.
pub const MARKER_OCCURRENCE: usize = 2;

/// Leading bytes of a 7z archive.
pub const SEVEN_ZIP_MAGIC: &[u8] = b"7z";

/// Number of bytes after the marker searched for [`SEVEN_ZIP_MAGIC`].
pub const MAGIC_PROBE_LIMIT: usize = 0x10;

/// Stride of the magic probe.
pub const MAGIC_PROBE_STEP: usize = 2;

/// Locates the embedded archive in an installer image.
///
/// The archive is expected within [`MAGIC_PROBE_LIMIT`] bytes after the end of the second
/// [`INSTALL_END_MARKER`], at an even distance. If the magic does not show up there, the offset
/// right after the probed range is returned and a warning is logged; the archive tool will
/// reject the result if that guess is wrong.
///
/// # Errors
///
/// Returns [`Error::ArchiveNotFound`] if the marker does not occur twice, or if the installer
/// ends inside the probed range.
pub fn find_archive_offset(data: &[u8]) -> Result<usize> {
    let mut marker_end = 0;
    for _ in 0..MARKER_OCCURRENCE {
        let Some(position) = find(&data[marker_end..], INSTALL_END_MARKER) else {
            return Err(Error::ArchiveNotFound);
        };
        marker_end += position + INSTALL_END_MARKER.len();
    }

    for skip in (0..MAGIC_PROBE_LIMIT).step_by(MAGIC_PROBE_STEP) {
        let start = marker_end + skip;
        let Some(candidate) = data.get(start..start + SEVEN_ZIP_MAGIC.len()) else {
            return Err(Error::ArchiveNotFound);
        };

        if candidate == SEVEN_ZIP_MAGIC {
            log::debug!("archive magic at offset 0x{start:x}");
            return Ok(start);
        }
    }

    let fallback = marker_end + MAGIC_PROBE_LIMIT;
    if fallback >= data.len() {
        return Err(Error::ArchiveNotFound);
    }

    log::warn!(
        "no archive magic within 0x{MAGIC_PROBE_LIMIT:x} bytes of the install marker, assuming offset 0x{fallback:x}"
    );
    Ok(fallback)
}

/// Copies the archive embedded in `installer` to `out`, returning its size.
///
/// # Errors
///
/// Returns [`Error::FileError`] on I/O failures, or [`Error::ArchiveNotFound`] if the installer
/// does not carry an archive.
pub fn carve_archive(installer: &Path, out: &Path) -> Result<u64> {
    let file = fs::File::open(installer)?;
    // SAFETY: the mapping is read-only and dropped before this function returns
    let data = unsafe { Mmap::map(&file) }?;

    let offset = find_archive_offset(&data)?;
    let archive = &data[offset..];
    fs::write(out, archive)?;

    Ok(archive.len() as u64)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

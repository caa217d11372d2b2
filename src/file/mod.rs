//! PE container loading and code section location.
//!
//! The [`File`] type owns the raw bytes of a PE32+ image (either memory-mapped from disk or
//! held in a buffer) together with the `goblin` parse of its headers. Loading rejects every
//! container that is not an AMD64 PE32+ image, so all later stages can assume 64-bit x86 code.
//!
//! [`File::code_region`] (or the buffer-only [`locate_code_region`]) returns the `.text`
//! section as a [`CodeRegion`], already truncated to its in-memory size.

mod backend;
mod region;

use std::path::Path;

use crate::{
    Error::{Empty, SectionNotFound, UnsupportedFormat},
    Result,
};
use backend::{Memory, Physical};
use goblin::pe::{header::COFF_MACHINE_X86_64, section_table::SectionTable, PE};
use ouroboros::self_referencing;

pub use backend::Backend;
pub use region::CodeRegion;

/// Name of the section that holds the executable code of the target library.
pub const CODE_SECTION_NAME: &str = ".text";

/// A parsed AMD64 PE32+ image.
///
/// # Examples
///
/// ```rust,no_run
/// use privscope::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("_nvspcaps64.dll"))?;
/// let region = file.code_region()?;
/// println!(".text: {} bytes at file offset 0x{:x}", region.len(), region.file_offset());
/// # Ok::<(), privscope::Error>(())
/// ```
#[self_referencing]
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads and memory-maps a PE file from the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is empty, or is not an AMD64 PE32+ image.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty or is not an AMD64 PE32+ image.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let pe = parse_container(data.data())?;
            log::debug!(
                "loaded PE32+ image: {} sections, image base 0x{:x}",
                pe.sections.len(),
                pe.image_base
            );
            Ok(pe)
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw bytes of the whole file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Returns a bounds-checked slice of the file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Returns the preferred load address of the image.
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.with_pe(|pe| pe.image_base)
    }

    /// Returns the COFF machine type, always `0x8664` for a loaded file.
    #[must_use]
    pub fn machine(&self) -> u16 {
        self.with_pe(|pe| pe.header.coff_header.machine)
    }

    /// Returns an iterator over the section headers.
    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.with_pe(|pe| pe.sections.iter())
    }

    /// Looks up a section header by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SectionNotFound`] if no section carries this name.
    pub fn section(&self, name: &str) -> Result<&SectionTable> {
        self.sections()
            .find(|section| section_name(section) == name)
            .ok_or_else(|| SectionNotFound(name.to_string()))
    }

    /// Returns the primary code section, truncated to its in-memory size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SectionNotFound`] if the image has no `.text` section,
    /// [`crate::Error::Malformed`] if the section stores no data, or
    /// [`crate::Error::OutOfBounds`] if its raw data lies outside the file.
    pub fn code_region(&self) -> Result<CodeRegion<'_>> {
        let section = self.section(CODE_SECTION_NAME)?;
        region_of(section, self.data())
    }
}

/// Locates the primary code section in a PE buffer without taking ownership of it.
///
/// This is the pure form of [`File::code_region`]: it parses the headers of `data`, rejects
/// anything but AMD64 PE32+, and borrows the `.text` bytes straight out of `data`.
///
/// # Errors
///
/// Returns [`crate::Error::Empty`], [`crate::Error::UnsupportedFormat`],
/// [`crate::Error::SectionNotFound`], [`crate::Error::Malformed`] or
/// [`crate::Error::OutOfBounds`].
pub fn locate_code_region(data: &[u8]) -> Result<CodeRegion<'_>> {
    if data.is_empty() {
        return Err(Empty);
    }

    let pe = parse_container(data)?;
    let section = pe
        .sections
        .iter()
        .find(|section| section_name(section) == CODE_SECTION_NAME)
        .ok_or_else(|| SectionNotFound(CODE_SECTION_NAME.to_string()))?;

    region_of(section, data)
}

fn parse_container(data: &[u8]) -> Result<PE<'_>> {
    let pe = PE::parse(data).map_err(|error| UnsupportedFormat {
        reason: error.to_string(),
    })?;

    let machine = pe.header.coff_header.machine;
    if machine != COFF_MACHINE_X86_64 {
        return Err(UnsupportedFormat {
            reason: format!("machine type 0x{machine:04x} is not AMD64"),
        });
    }

    if !pe.is_64 || pe.header.optional_header.is_none() {
        return Err(UnsupportedFormat {
            reason: "image is not PE32+".to_string(),
        });
    }

    Ok(pe)
}

fn region_of<'a>(section: &SectionTable, data: &'a [u8]) -> Result<CodeRegion<'a>> {
    let offset = section.pointer_to_raw_data as usize;
    let raw_size = section.size_of_raw_data as usize;
    if raw_size == 0 {
        return Err(malformed_error!(
            "section '{}' has no raw data",
            section_name(section)
        ));
    }

    let Some(end) = offset.checked_add(raw_size) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    Ok(CodeRegion::new(
        &data[offset..end],
        section.virtual_size as usize,
        offset,
        section.virtual_address,
    ))
}

fn section_name(section: &SectionTable) -> &str {
    std::str::from_utf8(&section.name)
        .unwrap_or("<invalid>")
        .trim_end_matches('\0')
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test::{PeBuilder, IDIOM_00_0F};

    #[test]
    fn load_buffer() {
        let image = PeBuilder::new().code(IDIOM_00_0F.to_vec()).build();
        let file = File::from_mem(image).unwrap();

        assert_eq!(file.data()[0..2], [0x4D, 0x5A]);
        assert_eq!(file.machine(), COFF_MACHINE_X86_64);
        assert_eq!(file.imagebase(), 0x1_8000_0000);
        assert!(file.section(".text").is_ok());

        let region = file.code_region().unwrap();
        assert_eq!(region.bytes(), &IDIOM_00_0F[..]);
        assert_eq!(region.virtual_size(), IDIOM_00_0F.len());
    }

    #[test]
    fn load_file() {
        let image = PeBuilder::new().code(IDIOM_00_0F.to_vec()).build();
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(&image).unwrap();

        let file = File::from_file(temp.path()).unwrap();
        assert_eq!(file.len(), image.len());
        assert_eq!(file.code_region().unwrap().bytes(), &IDIOM_00_0F[..]);
    }

    #[test]
    fn load_empty() {
        assert!(matches!(File::from_mem(vec![]), Err(Empty)));
        assert!(matches!(locate_code_region(&[]), Err(Empty)));
    }

    #[test]
    fn load_garbage() {
        let result = File::from_mem(vec![0xCC; 512]);
        assert!(matches!(result, Err(UnsupportedFormat { .. })));
    }

    #[test]
    fn rejects_other_machines() {
        // IMAGE_FILE_MACHINE_I386 and IMAGE_FILE_MACHINE_ARM64
        for machine in [0x014c_u16, 0xaa64] {
            let image = PeBuilder::new()
                .machine(machine)
                .code(IDIOM_00_0F.to_vec())
                .build();

            match locate_code_region(&image) {
                Err(UnsupportedFormat { reason }) => assert!(reason.contains("AMD64")),
                other => panic!("expected UnsupportedFormat, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_pe32_optional_header() {
        let image = PeBuilder::new().pe32().code(IDIOM_00_0F.to_vec()).build();

        match locate_code_region(&image) {
            Err(UnsupportedFormat { reason }) => assert!(reason.contains("PE32+")),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert!(matches!(
            File::from_mem(image),
            Err(UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_text_section() {
        let image = PeBuilder::new()
            .section_name(*b".code\0\0\0")
            .code(IDIOM_00_0F.to_vec())
            .build();

        match locate_code_region(&image) {
            Err(SectionNotFound(name)) => assert_eq!(name, ".text"),
            other => panic!("expected SectionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn padding_is_excluded() {
        let mut code = IDIOM_00_0F.to_vec();
        let virtual_size = code.len();
        code.resize(0x200, 0xCC);

        let image = PeBuilder::new()
            .code(code)
            .virtual_size(virtual_size as u32)
            .build();

        let region = locate_code_region(&image).unwrap();
        assert_eq!(region.len(), virtual_size);
        assert_eq!(region.raw_size(), 0x200);
        assert_eq!(region.bytes(), &IDIOM_00_0F[..]);
    }

    #[test]
    fn section_without_data() {
        let image = PeBuilder::new().code(vec![]).virtual_size(0x100).build();
        match locate_code_region(&image) {
            Err(crate::Error::Malformed { message, .. }) => assert!(message.contains(".text")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn raw_data_out_of_bounds() {
        let mut image = PeBuilder::new().code(IDIOM_00_0F.to_vec()).build();
        // Cut the section data short; the headers still announce the full raw size.
        image.truncate(image.len() - 0x10);

        assert!(matches!(
            locate_code_region(&image),
            Err(crate::Error::OutOfBounds { .. })
        ));
    }
}

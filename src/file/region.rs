/// The executable bytes of a code section.
///
/// The on-disk size of a section is rounded up to the file alignment, while its virtual size is
/// what the loader actually maps. Bytes past the virtual size are alignment padding and would only
/// produce spurious decodes, so [`CodeRegion::bytes`] stops at the virtual size whenever the raw
/// data is larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRegion<'a> {
    bytes: &'a [u8],
    raw_size: usize,
    virtual_size: usize,
    file_offset: usize,
    virtual_address: u32,
}

impl<'a> CodeRegion<'a> {
    /// Builds a region from the raw section data and the section's declared in-memory size.
    ///
    /// A `virtual_size` of zero is treated as "same as raw", which some linkers emit.
    #[must_use]
    pub fn new(raw: &'a [u8], virtual_size: usize, file_offset: usize, virtual_address: u32) -> Self {
        let usable = if virtual_size != 0 && raw.len() > virtual_size {
            &raw[..virtual_size]
        } else {
            raw
        };

        CodeRegion {
            bytes: usable,
            raw_size: raw.len(),
            virtual_size,
            file_offset,
            virtual_address,
        }
    }

    /// Builds a region over bare machine code, without any container around it.
    #[must_use]
    pub fn from_code(code: &'a [u8]) -> Self {
        Self::new(code, code.len(), 0, 0)
    }

    /// The bytes that are scanned for instructions.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of scannable bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if there is nothing to scan.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size of the section data on disk, padding included.
    #[must_use]
    pub fn raw_size(&self) -> usize {
        self.raw_size
    }

    /// Declared in-memory size of the section.
    #[must_use]
    pub fn virtual_size(&self) -> usize {
        self.virtual_size
    }

    /// File offset of the first byte of the section.
    #[must_use]
    pub fn file_offset(&self) -> usize {
        self.file_offset
    }

    /// RVA of the first byte of the section.
    #[must_use]
    pub fn virtual_address(&self) -> u32 {
        self.virtual_address
    }
}

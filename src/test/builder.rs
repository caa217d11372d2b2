//! Minimal AMD64 PE32+ images with a single code section.
//!
//! The builder can also emit a PE32 optional header, to exercise the rejection of images that
//! claim AMD64 but are not 64-bit.

const PE_OFFSET: usize = 0x80;
const COFF_HEADER_SIZE: usize = 20;
const OPTIONAL_HEADER_SIZE: usize = 0xF0;
const OPTIONAL_HEADER32_SIZE: usize = 0xE0;
const SECTION_HEADER_SIZE: usize = 40;
const FILE_ALIGNMENT: usize = 0x200;
const SECTION_ALIGNMENT: u32 = 0x1000;
const IMAGE_BASE: u64 = 0x1_8000_0000;
const CODE_RVA: u32 = 0x1000;

/// Builds a DLL image whose only section holds the given code.
///
/// The section's raw data starts at the file alignment and runs to the end of the file, with
/// `size_of_raw_data` equal to the code length.
pub struct PeBuilder {
    machine: u16,
    section_name: [u8; 8],
    code: Vec<u8>,
    virtual_size: Option<u32>,
    pe32: bool,
}

impl PeBuilder {
    pub fn new() -> Self {
        PeBuilder {
            machine: 0x8664,
            section_name: *b".text\0\0\0",
            code: vec![0xC3],
            virtual_size: None,
            pe32: false,
        }
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn section_name(mut self, name: [u8; 8]) -> Self {
        self.section_name = name;
        self
    }

    pub fn code(mut self, code: Vec<u8>) -> Self {
        self.code = code;
        self
    }

    /// Overrides the section's in-memory size, which defaults to the code length.
    pub fn virtual_size(mut self, size: u32) -> Self {
        self.virtual_size = Some(size);
        self
    }

    /// Emits a PE32 (`0x010B`) optional header instead of PE32+.
    pub fn pe32(mut self) -> Self {
        self.pe32 = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let optional_size = if self.pe32 {
            OPTIONAL_HEADER32_SIZE
        } else {
            OPTIONAL_HEADER_SIZE
        };
        // PE32 narrows the image base and the stack/heap sizes to 32 bits
        let wide = |value: u64| -> Vec<u8> {
            if self.pe32 {
                (value as u32).to_le_bytes().to_vec()
            } else {
                value.to_le_bytes().to_vec()
            }
        };

        let raw_size = self.code.len() as u32;
        let virtual_size = self.virtual_size.unwrap_or(raw_size);
        let size_of_image = CODE_RVA + virtual_size.max(1).next_multiple_of(SECTION_ALIGNMENT);

        let mut image = vec![0_u8; FILE_ALIGNMENT];

        // DOS header
        image[0..2].copy_from_slice(b"MZ");
        image[0x3C..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());

        // PE signature and COFF header
        let mut at = PE_OFFSET;
        put(&mut image, &mut at, b"PE\0\0");
        put(&mut image, &mut at, &self.machine.to_le_bytes());
        put(&mut image, &mut at, &1_u16.to_le_bytes()); // number_of_sections
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // time_date_stamp
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // pointer_to_symbol_table
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // number_of_symbol_table
        put(&mut image, &mut at, &(optional_size as u16).to_le_bytes());
        // EXECUTABLE_IMAGE | LARGE_ADDRESS_AWARE | DLL
        put(&mut image, &mut at, &0x2022_u16.to_le_bytes());
        debug_assert_eq!(at, PE_OFFSET + 4 + COFF_HEADER_SIZE);

        // Optional header, standard fields
        let optional_start = at;
        let magic: u16 = if self.pe32 { 0x010B } else { 0x020B };
        put(&mut image, &mut at, &magic.to_le_bytes());
        put(&mut image, &mut at, &[14, 0]); // linker version
        put(&mut image, &mut at, &raw_size.to_le_bytes()); // size_of_code
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // size_of_initialized_data
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // size_of_uninitialized_data
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // address_of_entry_point
        put(&mut image, &mut at, &CODE_RVA.to_le_bytes()); // base_of_code
        if self.pe32 {
            put(&mut image, &mut at, &0_u32.to_le_bytes()); // base_of_data
        }

        // Windows fields
        let image_base = if self.pe32 { 0x1000_0000 } else { IMAGE_BASE };
        put(&mut image, &mut at, &wide(image_base));
        put(&mut image, &mut at, &SECTION_ALIGNMENT.to_le_bytes());
        put(&mut image, &mut at, &(FILE_ALIGNMENT as u32).to_le_bytes());
        put(&mut image, &mut at, &6_u16.to_le_bytes()); // os version
        put(&mut image, &mut at, &0_u16.to_le_bytes());
        put(&mut image, &mut at, &0_u16.to_le_bytes()); // image version
        put(&mut image, &mut at, &0_u16.to_le_bytes());
        put(&mut image, &mut at, &6_u16.to_le_bytes()); // subsystem version
        put(&mut image, &mut at, &0_u16.to_le_bytes());
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // win32_version_value
        put(&mut image, &mut at, &size_of_image.to_le_bytes());
        put(&mut image, &mut at, &(FILE_ALIGNMENT as u32).to_le_bytes()); // size_of_headers
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // checksum
        put(&mut image, &mut at, &2_u16.to_le_bytes()); // subsystem: windows gui
        put(&mut image, &mut at, &0x0160_u16.to_le_bytes()); // dll_characteristics
        put(&mut image, &mut at, &wide(0x10_0000)); // stack reserve
        put(&mut image, &mut at, &wide(0x1000)); // stack commit
        put(&mut image, &mut at, &wide(0x10_0000)); // heap reserve
        put(&mut image, &mut at, &wide(0x1000)); // heap commit
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // loader_flags
        put(&mut image, &mut at, &16_u32.to_le_bytes()); // number_of_rva_and_sizes

        // 16 empty data directories
        at += 16 * 8;
        debug_assert_eq!(at, optional_start + optional_size);

        // Section header
        put(&mut image, &mut at, &self.section_name);
        put(&mut image, &mut at, &virtual_size.to_le_bytes());
        put(&mut image, &mut at, &CODE_RVA.to_le_bytes());
        put(&mut image, &mut at, &raw_size.to_le_bytes());
        put(&mut image, &mut at, &(FILE_ALIGNMENT as u32).to_le_bytes());
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // pointer_to_relocations
        put(&mut image, &mut at, &0_u32.to_le_bytes()); // pointer_to_linenumbers
        put(&mut image, &mut at, &0_u16.to_le_bytes()); // number_of_relocations
        put(&mut image, &mut at, &0_u16.to_le_bytes()); // number_of_linenumbers
        // CODE | EXECUTE | READ
        put(&mut image, &mut at, &0x6000_0020_u32.to_le_bytes());
        debug_assert!(at <= FILE_ALIGNMENT);

        image.extend_from_slice(&self.code);
        image
    }
}

fn put(image: &mut [u8], at: &mut usize, bytes: &[u8]) {
    image[*at..*at + bytes.len()].copy_from_slice(bytes);
    *at += bytes.len();
}

#[test]
fn layout() {
    let image = PeBuilder::new().code(vec![0x90; 0x30]).build();
    assert_eq!(image.len(), FILE_ALIGNMENT + 0x30);
    assert_eq!(&image[PE_OFFSET..PE_OFFSET + 4], b"PE\0\0");
    // first section header follows the optional header directly
    let section = PE_OFFSET + 4 + COFF_HEADER_SIZE + OPTIONAL_HEADER_SIZE;
    assert_eq!(&image[section..section + 5], b".text");
}

#[test]
fn layout_pe32() {
    let image = PeBuilder::new().pe32().build();
    let optional = PE_OFFSET + 4 + COFF_HEADER_SIZE;
    assert_eq!(&image[optional..optional + 2], &[0x0B, 0x01]);
    let section = optional + OPTIONAL_HEADER32_SIZE;
    assert_eq!(&image[section..section + 5], b".text");
}

//! x86-64 instruction type definitions.
//!
//! These types are a deliberately small projection of what iced-x86 produces. Only the facts
//! the idiom recognizer inspects survive the conversion:
//!
//! - [`X86Memory`] - Memory operand scale and displacement
//! - [`X86Operand`] - Memory, immediate, or anything else
//! - [`DecodedInstruction`] - Mnemonic, operands, length and the raw opcode word
//! - [`OpcodeSignature`] - The upper 16 bits of an opcode word, used for matching
//!
//! All of them are `Copy`, so a decoded instruction can be pushed into a fixed-size window
//! without allocating.

use iced_x86::Mnemonic;

/// Maximum number of explicit operands an x86 instruction can carry.
pub const MAX_OPERANDS: usize = 5;

/// A memory operand.
///
/// Registers are not retained: the store shapes that matter are fully identified by their
/// opcode word, and only the scale and displacement vary between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X86Memory {
    /// Scale factor of the index register. iced reports `1` when there is no index.
    pub scale: u8,
    /// Signed displacement added to the effective address.
    pub displacement: i64,
    /// Encoded size of the displacement in bytes (0, 1, 2, 4 or 8).
    pub displacement_size: u8,
    /// Size of the memory access in bytes.
    pub size: u8,
}

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum X86Operand {
    /// Memory reference
    Memory(X86Memory),
    /// Immediate value, sign-extended to 64 bits
    Immediate(i64),
    /// Register, branch target or any other operand kind
    #[default]
    Other,
}

impl X86Operand {
    /// Returns the memory operand, if this is one.
    #[must_use]
    pub fn as_memory(&self) -> Option<X86Memory> {
        match self {
            X86Operand::Memory(memory) => Some(*memory),
            _ => None,
        }
    }

    /// Returns the immediate value, if this is one.
    #[must_use]
    pub fn as_immediate(&self) -> Option<i64> {
        match self {
            X86Operand::Immediate(value) => Some(*value),
            _ => None,
        }
    }
}

/// A single decoded instruction together with its position in the code region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Offset of the first byte, relative to the start of the decoded buffer
    pub offset: usize,
    /// Encoded length in bytes, always at least 1
    pub length: usize,
    /// Instruction mnemonic
    pub mnemonic: Mnemonic,
    /// First four bytes following all legacy and REX prefixes, big-endian and zero-padded
    pub opcode_word: u32,
    operands: [X86Operand; MAX_OPERANDS],
    operand_count: u8,
}

impl DecodedInstruction {
    /// Creates a decoded instruction. Operands past [`MAX_OPERANDS`] are dropped.
    #[must_use]
    pub fn new(
        offset: usize,
        length: usize,
        mnemonic: Mnemonic,
        opcode_word: u32,
        operands: &[X86Operand],
    ) -> Self {
        let count = operands.len().min(MAX_OPERANDS);
        let mut slots = [X86Operand::Other; MAX_OPERANDS];
        slots[..count].copy_from_slice(&operands[..count]);
        #[allow(clippy::cast_possible_truncation)]
        let operand_count = count as u8;

        DecodedInstruction {
            offset,
            length,
            mnemonic,
            opcode_word,
            operands: slots,
            operand_count,
        }
    }

    /// The explicit operands, destination first.
    #[must_use]
    pub fn operands(&self) -> &[X86Operand] {
        &self.operands[..usize::from(self.operand_count)]
    }

    /// Offset of the byte following this instruction.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns `true` for any form of `mov`.
    #[must_use]
    pub fn is_mov(&self) -> bool {
        self.mnemonic == Mnemonic::Mov
    }

    /// The destination operand, if it is a memory reference.
    #[must_use]
    pub fn memory_destination(&self) -> Option<X86Memory> {
        self.operands().first().and_then(X86Operand::as_memory)
    }

    /// The source operand, if it is an immediate.
    #[must_use]
    pub fn immediate_source(&self) -> Option<i64> {
        self.operands().get(1).and_then(X86Operand::as_immediate)
    }
}

/// The leading two opcode bytes (opcode plus ModRM) of an instruction shape.
///
/// ```rust
/// use privscope::analysis::OpcodeSignature;
///
/// let store = OpcodeSignature::new(0xC785);
/// assert!(store.matches(0xC785_C0FF));
/// assert!(!store.matches(0xC744_2430));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeSignature(u16);

impl OpcodeSignature {
    /// Creates a signature from the opcode byte (high) and ModRM byte (low).
    #[must_use]
    pub const fn new(signature: u16) -> Self {
        OpcodeSignature(signature)
    }

    /// The raw 16-bit signature.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns `true` if the upper 16 bits of `opcode_word` equal this signature.
    #[must_use]
    pub const fn matches(self, opcode_word: u32) -> bool {
        (opcode_word >> 16) as u16 == self.0
    }
}

//! x86-64 instruction decoder using iced-x86.
//!
//! This module provides a thin wrapper around iced-x86 that converts its
//! instruction representation to our simplified [`DecodedInstruction`] type.

use crate::{
    analysis::x86::types::{DecodedInstruction, X86Memory, X86Operand, MAX_OPERANDS},
    Error, Result,
};
use iced_x86::{Decoder, DecoderOptions, Instruction, OpKind};

/// Decodes exactly one 64-bit instruction starting at `offset`.
///
/// The returned offset is relative to the start of `bytes`, so callers can walk a buffer by
/// feeding back [`DecodedInstruction::end`].
///
/// # Arguments
///
/// * `bytes` - The x86-64 machine code bytes
/// * `offset` - Offset within `bytes` to decode at
///
/// # Errors
///
/// Returns [`Error::DecodeFailure`] if `offset` is past the end of `bytes`, or if the bytes at
/// `offset` do not form a complete, valid instruction. An instruction cut off by the end of the
/// buffer counts as invalid.
///
/// # Examples
///
/// ```rust
/// use privscope::analysis::decode_one;
///
/// // mov dword [rsp+0x30], 0x10
/// let bytes = [0xC7, 0x44, 0x24, 0x30, 0x10, 0x00, 0x00, 0x00];
/// let instr = decode_one(&bytes, 0)?;
/// assert_eq!(instr.length, 8);
/// assert_eq!(instr.opcode_word, 0xC744_2430);
/// assert_eq!(instr.immediate_source(), Some(16));
/// # Ok::<(), privscope::Error>(())
/// ```
pub fn decode_one(bytes: &[u8], offset: usize) -> Result<DecodedInstruction> {
    if offset >= bytes.len() {
        return Err(Error::DecodeFailure { offset });
    }

    let mut decoder = Decoder::with_ip(64, &bytes[offset..], offset as u64, DecoderOptions::NONE);
    let instr = decoder.decode();
    if instr.is_invalid() {
        return Err(Error::DecodeFailure { offset });
    }

    let length = instr.len();
    let encoded = &bytes[offset..offset + length];
    // iced widens disp32 to 8 in 64-bit mode; the constant offsets hold the encoded width
    #[allow(clippy::cast_possible_truncation)]
    let displacement_size = decoder.get_constant_offsets(&instr).displacement_size() as u8;

    let mut operands = [X86Operand::Other; MAX_OPERANDS];
    let count = (instr.op_count() as usize).min(MAX_OPERANDS);
    for (index, operand) in operands.iter_mut().enumerate().take(count) {
        #[allow(clippy::cast_possible_truncation)]
        let index = index as u32;
        *operand = convert_operand(&instr, index, displacement_size);
    }

    Ok(DecodedInstruction::new(
        offset,
        length,
        instr.mnemonic(),
        opcode_word(encoded),
        &operands[..count],
    ))
}

/// Computes the opcode word of an encoded instruction.
///
/// Legacy prefixes (segment overrides, operand/address size, `lock`, `rep`) and REX prefixes are
/// skipped; the next four bytes are packed big-endian. Instructions shorter than that are padded
/// with zeros on the right.
#[must_use]
pub fn opcode_word(encoded: &[u8]) -> u32 {
    let start = encoded
        .iter()
        .position(|byte| !is_prefix(*byte))
        .unwrap_or(encoded.len());

    let mut word = [0_u8; 4];
    for (slot, byte) in word.iter_mut().zip(&encoded[start..]) {
        *slot = *byte;
    }

    u32::from_be_bytes(word)
}

fn is_prefix(byte: u8) -> bool {
    matches!(
        byte,
        0x26 | 0x2E | 0x36 | 0x3E | 0x64 | 0x65 | 0x66 | 0x67 | 0xF0 | 0xF2 | 0xF3 | 0x40..=0x4F
    )
}

/// Convert an operand at the given index to our representation.
fn convert_operand(instr: &Instruction, index: u32, displacement_size: u8) -> X86Operand {
    match instr.op_kind(index) {
        OpKind::Immediate8 => X86Operand::Immediate(i64::from(instr.immediate8() as i8)),
        OpKind::Immediate16 => X86Operand::Immediate(i64::from(instr.immediate16() as i16)),
        OpKind::Immediate32 => X86Operand::Immediate(i64::from(instr.immediate32() as i32)),
        OpKind::Immediate64 => X86Operand::Immediate(instr.immediate64() as i64),
        OpKind::Immediate8to16 => X86Operand::Immediate(i64::from(instr.immediate8to16())),
        OpKind::Immediate8to32 => X86Operand::Immediate(i64::from(instr.immediate8to32())),
        OpKind::Immediate8to64 => X86Operand::Immediate(instr.immediate8to64()),
        OpKind::Immediate32to64 => X86Operand::Immediate(instr.immediate32to64()),
        OpKind::Memory => X86Operand::Memory(convert_memory_operand(instr, displacement_size)),
        _ => X86Operand::Other,
    }
}

/// Convert the memory operand of an instruction.
#[allow(clippy::cast_possible_truncation)]
fn convert_memory_operand(instr: &Instruction, displacement_size: u8) -> X86Memory {
    X86Memory {
        scale: instr.memory_index_scale() as u8,
        displacement: instr.memory_displacement64() as i64,
        displacement_size,
        size: instr.memory_size().size() as u8,
    }
}

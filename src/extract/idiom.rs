//! Shape of the private data initialization in compiled code.
//!
//! The source initializes a parameter block roughly like this:
//!
//! ```c
//! NVFBC_CREATE_PARAMS params = {0};
//! params.dwPrivateDataSize = 16;
//! params.pPrivateData = magic;   // uint32_t magic[4] = { ... } on the stack
//! ```
//!
//! MSVC materializes `magic` with four `mov dword [rbp+disp32], imm32` stores (`C7 85`) at
//! consecutive displacements, and writes the size with `mov dword [rsp+disp8], 16` through a
//! SIB byte (`C7 44 24`). The size store comes last, within a few instructions of the data.

use crate::analysis::{DecodedInstruction, OpcodeSignature};

/// Immediate written by the length-field store.
pub const LENGTH_SENTINEL: i64 = 16;

/// Scale of the length-field store's memory operand.
pub const TERMINATOR_SCALE: u8 = 1;

/// Number of most recent instructions retained while scanning.
pub const WINDOW_CAPACITY: usize = 20;

/// Number of 4-byte data stores that make up the secret.
pub const CHUNK_COUNT: usize = 4;

/// Bytes contributed by each data store.
pub const CHUNK_SIZE: usize = 4;

/// Length of the private data in bytes.
pub const SECRET_LEN: usize = CHUNK_COUNT * CHUNK_SIZE;

/// Distance between the displacements of two consecutive data stores.
pub const CHUNK_STRIDE: i64 = CHUNK_SIZE as i64;

/// `mov r/m32, imm32` with ModRM mod=01 and a SIB byte.
pub const TERMINATOR: OpcodeSignature = OpcodeSignature::new(0xC744);

/// `mov r/m32, imm32` with ModRM mod=10, rbp base.
pub const DATA_STORE: OpcodeSignature = OpcodeSignature::new(0xC785);

/// Returns `true` if `instr` is the length-field store that ends the idiom.
#[must_use]
pub fn is_terminator(instr: &DecodedInstruction) -> bool {
    instr.is_mov()
        && TERMINATOR.matches(instr.opcode_word)
        && instr
            .memory_destination()
            .is_some_and(|memory| memory.scale == TERMINATOR_SCALE)
        && instr.immediate_source() == Some(LENGTH_SENTINEL)
}

/// Returns the displacement and immediate of a data store, or `None` for anything else.
#[must_use]
pub fn data_store(instr: &DecodedInstruction) -> Option<(i64, u32)> {
    if !instr.is_mov() || !DATA_STORE.matches(instr.opcode_word) {
        return None;
    }

    let memory = instr.memory_destination()?;
    let immediate = instr.immediate_source()?;

    // The decoder sign-extends imm32, truncation restores the encoded bits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let chunk = immediate as u32;

    Some((memory.displacement, chunk))
}

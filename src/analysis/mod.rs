//! Native code analysis.
//!
//! The only analysis this crate needs is linear decoding of x86-64 machine code, one instruction
//! at a time. Everything lives in [`x86`]; its public surface is re-exported here.

pub mod x86;

pub use iced_x86::Mnemonic;

pub use x86::{
    decode_one, opcode_word, DecodedInstruction, OpcodeSignature, X86Memory, X86Operand,
    MAX_OPERANDS,
};

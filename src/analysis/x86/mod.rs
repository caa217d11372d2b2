//! x86-64 native code decoding.
//!
//! This module wraps iced-x86 behind a single-instruction seam, [`decode_one`], and converts
//! its output into the compact [`DecodedInstruction`] representation that the idiom scanner
//! keeps in its trailing window.
//!
//! # Architecture
//!
//! ```text
//! .text bytes → decode_one (iced-x86) → DecodedInstruction → scanner window
//! ```
//!
//! Decoding is strictly linear. The scanner owns the cursor: on success it advances by the
//! instruction length, on [`crate::Error::DecodeFailure`] it advances by a single byte, so
//! data interleaved with code never stalls a scan.
//!
//! # Opcode Words
//!
//! Every decoded instruction carries an `opcode_word`: the first four bytes after legacy and REX
//! prefixes, packed big-endian. An [`OpcodeSignature`] compares the upper 16 bits of that word,
//! which for the `C7 /0` store family is the opcode byte followed by the ModRM byte, and thereby
//! pins down the addressing form as well.
//!
//! # Example
//!
//! ```rust
//! use privscope::analysis::{decode_one, OpcodeSignature};
//!
//! // mov dword [rbp-0x40], 0x4e764642
//! let bytes = [0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF, 0x42, 0x46, 0x76, 0x4E];
//! let instr = decode_one(&bytes, 0)?;
//!
//! assert!(OpcodeSignature::new(0xC785).matches(instr.opcode_word));
//! assert_eq!(instr.memory_destination().map(|m| m.displacement), Some(-0x40));
//! assert_eq!(instr.immediate_source(), Some(0x4E76_4642));
//! # Ok::<(), privscope::Error>(())
//! ```

mod decoder;
mod types;

pub use decoder::{decode_one, opcode_word};
pub use types::{
    DecodedInstruction, OpcodeSignature, X86Memory, X86Operand, MAX_OPERANDS,
};

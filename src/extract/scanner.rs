//! Linear scan of a code region for the private data idiom.
//!
//! The [`Scanner`] is a three-state machine driven by [`Scanner::step`]:
//!
//! ```text
//!             decode ok / failure
//!              ┌──────────┐
//!              ▼          │
//!          Scanning ──────┘
//!           │      │
//! terminator│      │cursor == end
//!           ▼      ▼
//!        Found   Exhausted
//! ```
//!
//! Every step advances the cursor by at least one byte, so a scan performs at most as many
//! steps as the region has bytes.

use crate::{
    analysis::{decode_one, DecodedInstruction},
    extract::idiom::{is_terminator, WINDOW_CAPACITY},
    utils::TrailingWindow,
    Error, Result,
};

/// The instructions leading up to (and including) the current cursor position.
pub type InstructionWindow = TrailingWindow<DecodedInstruction, WINDOW_CAPACITY>;

/// State of a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// More bytes remain to be decoded
    Scanning,
    /// The length-field store was decoded; the window ends with it
    Found,
    /// The cursor reached the end of the region without finding the idiom
    Exhausted,
}

/// Walks a code region one instruction at a time.
pub struct Scanner<'a> {
    code: &'a [u8],
    cursor: usize,
    state: ScanState,
    window: InstructionWindow,
    decoded: usize,
    skipped: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `code`.
    #[must_use]
    pub fn new(code: &'a [u8]) -> Self {
        Scanner {
            code,
            cursor: 0,
            state: if code.is_empty() {
                ScanState::Exhausted
            } else {
                ScanState::Scanning
            },
            window: InstructionWindow::new(),
            decoded: 0,
            skipped: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Offset of the next byte to decode.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The trailing window as of the last step.
    #[must_use]
    pub fn window(&self) -> &InstructionWindow {
        &self.window
    }

    /// Performs one transition and returns the new state.
    ///
    /// Once the scanner left [`ScanState::Scanning`], further calls do nothing.
    pub fn step(&mut self) -> ScanState {
        if self.state != ScanState::Scanning {
            return self.state;
        }

        match decode_one(self.code, self.cursor) {
            Ok(instr) => {
                self.decoded += 1;
                self.cursor = instr.end();
                self.window.push(instr);

                if is_terminator(&instr) {
                    self.state = ScanState::Found;
                    return self.state;
                }
            }
            Err(_) => {
                // Data or a misaligned start, resynchronize on the next byte.
                self.skipped += 1;
                self.cursor += 1;
            }
        }

        if self.cursor >= self.code.len() {
            self.state = ScanState::Exhausted;
        }

        self.state
    }

    /// Steps until the scanner leaves [`ScanState::Scanning`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdiomNotFound`] if the region is exhausted first.
    pub fn run(mut self) -> Result<IdiomMatch> {
        while self.step() == ScanState::Scanning {}

        if self.state == ScanState::Exhausted {
            log::debug!(
                "scan exhausted after {} instructions ({} undecodable bytes)",
                self.decoded,
                self.skipped
            );
            return Err(Error::IdiomNotFound);
        }

        let Some(terminator) = self.window.newest().copied() else {
            return Err(Error::IdiomNotFound);
        };

        log::debug!(
            "length-field store at offset 0x{:x} after {} instructions ({} undecodable bytes)",
            terminator.offset,
            self.decoded,
            self.skipped
        );

        Ok(IdiomMatch {
            window: self.window,
            terminator,
            decoded: self.decoded,
            skipped: self.skipped,
        })
    }
}

/// A successful scan: the trailing window ending at the length-field store.
#[derive(Debug, Clone)]
pub struct IdiomMatch {
    window: InstructionWindow,
    terminator: DecodedInstruction,
    decoded: usize,
    skipped: usize,
}

impl IdiomMatch {
    /// The retained instructions, oldest first. The last one is the terminator.
    #[must_use]
    pub fn window(&self) -> &InstructionWindow {
        &self.window
    }

    /// The length-field store that ended the scan.
    #[must_use]
    pub fn terminator(&self) -> &DecodedInstruction {
        &self.terminator
    }

    /// Offset of the terminator within the scanned region.
    #[must_use]
    pub fn terminator_offset(&self) -> usize {
        self.terminator.offset
    }

    /// Number of instructions decoded before stopping.
    #[must_use]
    pub fn decoded(&self) -> usize {
        self.decoded
    }

    /// Number of single-byte resynchronizations after decode failures.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Scans `code` for the private data idiom.
///
/// # Errors
///
/// Returns [`Error::IdiomNotFound`] if no length-field store occurs in `code`.
pub fn scan(code: &[u8]) -> Result<IdiomMatch> {
    Scanner::new(code).run()
}

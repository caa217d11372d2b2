//! Recovery of the NvFBC private data from a code region.
//!
//! The pipeline runs strictly forward:
//!
//! ```text
//! CodeRegion → Scanner (decode_one) → IdiomMatch → reconstruct → SecretBytes → Validator
//! ```
//!
//! [`Extractor`] composes the stages and applies an [`ExtractorConfig`]. The individual stages
//! are public as well, mostly for diagnostics and tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use privscope::{Extractor, File};
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("_nvspcaps64.dll"))?;
//! let extraction = Extractor::default().extract_file(&file)?;
//!
//! let result = extraction.result;
//! println!(
//!     "privateData is: {} ({})",
//!     result.bytes,
//!     if result.recognized { "valid" } else { "not valid" }
//! );
//! # Ok::<(), privscope::Error>(())
//! ```

pub mod idiom;
mod reconstruct;
mod scanner;
mod validate;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    config::ExtractorConfig,
    file::{locate_code_region, CodeRegion, File},
    Error, Result,
};

pub use reconstruct::{reconstruct, SecretBytes};
pub use scanner::{scan, IdiomMatch, InstructionWindow, ScanState, Scanner};
pub use validate::{checksum, validate, KnownBuild, ValidationResult, Validator};

/// A validated extraction together with where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    /// The reconstructed and checksummed private data
    pub result: ValidationResult,
    /// File offset of the length-field store
    pub file_offset: usize,
    /// RVA of the length-field store
    pub rva: u32,
}

/// Runs the full pipeline over code regions, buffers or files.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
    validator: Validator,
}

impl Extractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        let validator = Validator::with_checksums(&config.extra_checksums);
        Extractor { config, validator }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the private data from an already located code region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdiomNotFound`] if the region does not contain the length-field store,
    /// or [`Error::IncompleteExtraction`] if fewer than four data stores precede it.
    pub fn extract_region(&self, region: &CodeRegion<'_>) -> Result<Extraction> {
        let found = scan(region.bytes())?;
        let secret = reconstruct(found.window().iter());

        if !secret.is_complete() {
            log::warn!(
                "only {} of 4 data stores precede the length-field store at 0x{:x}",
                secret.chunks(),
                region.file_offset() + found.terminator_offset()
            );
            return Err(Error::IncompleteExtraction {
                chunks: secret.chunks(),
                bytes: secret,
            });
        }

        let offset = found.terminator_offset();
        #[allow(clippy::cast_possible_truncation)]
        let rva = region.virtual_address().wrapping_add(offset as u32);

        Ok(Extraction {
            result: self.validator.validate(secret),
            file_offset: region.file_offset() + offset,
            rva,
        })
    }

    /// Extracts the private data from a PE image held in memory.
    ///
    /// # Errors
    ///
    /// Returns any container error from [`locate_code_region`], or an extraction error from
    /// [`Extractor::extract_region`].
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Extraction> {
        let region = locate_code_region(data)?;
        self.extract_region(&region)
    }

    /// Extracts the private data from a loaded [`File`].
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract_bytes`].
    pub fn extract_file(&self, file: &File) -> Result<Extraction> {
        let region = file.code_region()?;
        log::debug!(
            "scanning {} bytes of code at file offset 0x{:x}",
            region.len(),
            region.file_offset()
        );
        self.extract_region(&region)
    }

    /// Memory-maps `path` and extracts the private data from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be opened, otherwise see
    /// [`Extractor::extract_bytes`].
    pub fn extract_path(&self, path: &Path) -> Result<Extraction> {
        let file = File::from_file(path)?;
        self.extract_file(&file)
    }

    /// Runs [`Extractor::extract_path`] over many files.
    ///
    /// Files are independent and processed on the rayon pool unless the configuration asks for
    /// sequential processing. The output order matches `paths`.
    pub fn extract_many(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<Extraction>)> {
        if self.config.parallel {
            paths
                .par_iter()
                .map(|path| (path.clone(), self.extract_path(path)))
                .collect()
        } else {
            paths
                .iter()
                .map(|path| (path.clone(), self.extract_path(path)))
                .collect()
        }
    }
}

/// Extracts and validates the private data of a PE image using the default configuration.
///
/// # Errors
///
/// See [`Extractor::extract_bytes`].
pub fn extract_private_data(data: &[u8]) -> Result<ValidationResult> {
    Extractor::default()
        .extract_bytes(data)
        .map(|extraction| extraction.result)
}

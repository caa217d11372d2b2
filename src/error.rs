use thiserror::Error;

use crate::extract::SecretBytes;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into four groups:
///
/// - **Container errors** ([`Error::UnsupportedFormat`], [`Error::SectionNotFound`],
///   [`Error::Malformed`], [`Error::OutOfBounds`], [`Error::Empty`]) are fatal.
///   The input binary is fixed, so there is nothing to retry.
/// - **Decoding** ([`Error::DecodeFailure`]) is routine. The scanner consumes it and
///   resynchronizes one byte further; it never leaves the pipeline.
/// - **Extraction outcomes** ([`Error::IdiomNotFound`], [`Error::IncompleteExtraction`]) mean the
///   secret could not be recovered with confidence.
/// - **Acquisition errors** cover locating, downloading and unpacking the target binary.
///
/// An unrecognized checksum is *not* an error, see [`crate::ValidationResult::recognized`].
#[derive(Error, Debug)]
pub enum Error {
    // Container errors
    /// The container is not a PE32+ image for the AMD64 machine type.
    ///
    /// Every other architecture is explicitly unsupported instead of being coerced.
    #[error("Unsupported container format - {reason}")]
    UnsupportedFormat {
        /// What disqualified the container
        reason: String,
    },

    /// The named section does not exist in the container.
    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    /// The file is damaged and could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading the file.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    // Decoding
    /// No valid instruction starts at this offset of the code region.
    #[error("No valid instruction at offset 0x{offset:x}")]
    DecodeFailure {
        /// Offset relative to the start of the code region
        offset: usize,
    },

    // Extraction outcomes
    /// The code region was exhausted without meeting the length-field store.
    #[error("The private data initialization was not found in the code section")]
    IdiomNotFound,

    /// The terminator was found, but fewer than four contiguous data stores precede it.
    ///
    /// `bytes` holds the partially filled buffer for diagnostics; it must not be used as the
    /// secret.
    #[error("Only {chunks} of 4 private data stores were recovered")]
    IncompleteExtraction {
        /// Number of 4-byte chunks that were accepted
        chunks: usize,
        /// The partially filled, zero padded buffer
        bytes: SecretBytes,
    },

    // Acquisition errors
    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The target binary is neither installed nor cached, and downloading is disabled.
    #[error("Could not locate {0}, and downloading is disabled")]
    BinaryNotFound(String),

    /// Fetching a remote resource failed.
    #[error("Download of {url} failed - {message}")]
    Download {
        /// The requested URL
        url: String,
        /// Transport or status description
        message: String,
    },

    /// The package manifest index did not contain what we need.
    #[error("Manifest - {0}")]
    Manifest(String),

    /// JSON decoding of a manifest index listing failed.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding of a package manifest failed.
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The installer does not contain the embedded archive marker.
    #[error("No embedded archive found in the installer")]
    ArchiveNotFound,

    /// Extracting an entry from the embedded archive failed.
    #[error("Archive - {0}")]
    Archive(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

//! # privscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! privscope library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all privscope operations
pub use crate::Error;

/// The result type used throughout privscope
pub use crate::Result;

/// Pipeline and acquisition configuration
pub use crate::{AcquireConfig, ExtractorConfig};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// PE loading and code section location
pub use crate::{locate_code_region, CodeRegion, File};

/// Private data extraction
pub use crate::{extract_private_data, Extraction, Extractor};

/// Binary acquisition
pub use crate::Acquirer;

// ================================================================================================
// Results
// ================================================================================================

/// Reconstructed bytes and their classification
pub use crate::{KnownBuild, SecretBytes, ValidationResult};

/// Binary identification
pub use crate::Fingerprint;

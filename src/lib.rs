// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/backend.rs' uses mmap to map a file into memory
// - 'acquire/installer.rs' maps the installer the same way

//! # privscope
//!
//! Static recovery of the NvFBC private data embedded in `_nvspcaps64.dll`, the capture library
//! shipped with NVIDIA GeForce Experience / ShadowPlay.
//!
//! The 16 bytes exist only as immediate operands of four `mov` instructions in the library's
//! code. `privscope` locates the `.text` section of the PE32+ image, decodes it linearly with
//! iced-x86, recognizes the store that writes the private data size, and reassembles the value
//! from the stores preceding it. The result is checked against the CRC-32 of the known builds.
//!
//! ## Features
//!
//! - **📦 Efficient memory access** - Memory-mapped file access, the code section is borrowed, never copied
//! - **🔍 Linear x86-64 decoding** - A single-instruction seam over iced-x86 with byte-wise resynchronization
//! - **🧩 Bounded idiom matching** - A fixed 20-instruction window, no allocation in the scan loop
//! - **🛡️ Validated output** - CRC-32 allow-list for the Steam and NVIDIA builds, extendable at runtime
//! - **🌐 Self-contained acquisition** - Install path, cache, or download via the winget manifests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use privscope::prelude::*;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("_nvspcaps64.dll"))?;
//! let result = Extractor::default().extract_file(&file)?.result;
//!
//! println!("privateData is: {} ({})", result.bytes, if result.recognized { "valid" } else { "not valid" });
//! # Ok::<(), privscope::Error>(())
//! ```
//!
//! ### Acquiring the binary
//!
//! ```rust,no_run
//! use privscope::{AcquireConfig, Acquirer, Extractor};
//!
//! let path = Acquirer::new(AcquireConfig::default()).locate()?;
//! let extraction = Extractor::default().extract_path(&path)?;
//! println!("{}", extraction.result.bytes);
//! # Ok::<(), privscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`File`] / [`locate_code_region`] - PE32+ parsing and `.text` location
//! - [`analysis`] - iced-x86 decoding behind [`analysis::decode_one`]
//! - [`extract`] - scanner, reconstruction and validation, composed by [`Extractor`]
//! - [`acquire`] - install path, cache, manifest index and installer carving
//! - [`fingerprint`] - size and digests of analyzed binaries
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with the crate-wide [`Error`]. Decode failures
//! are consumed inside the scanner; a checksum that is not on the allow-list is reported through
//! [`ValidationResult::recognized`] rather than as an error.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use privscope::prelude::*;
///
/// let result = extract_private_data(&std::fs::read("_nvspcaps64.dll")?)?;
/// println!("{} 0x{:08x}", result.bytes, result.checksum);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod prelude;

/// x86-64 instruction decoding.
pub mod analysis;

/// Locating, downloading and unpacking the capture library.
pub mod acquire;

/// Extraction and acquisition settings.
pub mod config;

/// The private data pipeline: scanning, reconstruction and validation.
pub mod extract;

/// PE container loading.
pub mod file;

/// Binary identification by size and digests.
pub mod fingerprint;

/// Small data structures used across the crate.
pub mod utils;

/// `privscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`crate::Error`]. This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `privscope` Error type
///
/// See [`Error`] for the list of variants and how they are grouped.
pub use error::Error;

pub use acquire::Acquirer;
pub use config::{AcquireConfig, ExtractorConfig};
pub use extract::{
    extract_private_data, Extraction, Extractor, KnownBuild, SecretBytes, ValidationResult,
};
pub use file::{locate_code_region, CodeRegion, File};
pub use fingerprint::Fingerprint;

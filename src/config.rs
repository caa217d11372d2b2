//! Configuration for extraction and acquisition
//!
//! Both configurations are plain structs with sensible [`Default`]s and a few named presets.
//! Built-in tables (the checksum allow-list, the opcode signatures, the window capacity) are
//! constants and cannot be changed here; configuration can only add to the allow-list.

use std::path::PathBuf;

/// Install location of the capture library on a machine with GeForce Experience.
pub const WELL_KNOWN_PATH: &str =
    r"C:\Program Files\NVIDIA Corporation\ShadowPlay\NVSPCAPS\_nvspcaps64.dll";

/// File name of the capture library.
pub const TARGET_NAME: &str = "_nvspcaps64.dll";

/// Directory listing of the GeForce Experience package in the winget community repository.
pub const MANIFEST_INDEX_URL: &str =
    "https://api.github.com/repos/microsoft/winget-pkgs/contents/manifests/n/Nvidia/GeForceExperience";

/// Configuration of the extraction pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Checksums accepted in addition to the built-in [`crate::KnownBuild`] values
    pub extra_checksums: Vec<u32>,

    /// Process several binaries on the rayon thread pool instead of one after another
    pub parallel: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extra_checksums: Vec::new(),
            parallel: true,
        }
    }
}

impl ExtractorConfig {
    /// Creates a configuration that processes binaries one at a time
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Adds a checksum to the allow-list
    #[must_use]
    pub fn with_checksum(mut self, checksum: u32) -> Self {
        if !self.extra_checksums.contains(&checksum) {
            self.extra_checksums.push(checksum);
        }
        self
    }
}

/// Configuration of the binary acquisition chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireConfig {
    /// A path supplied by the user, tried before anything else
    pub explicit_path: Option<PathBuf>,

    /// Install location tried after the explicit path
    pub well_known_path: PathBuf,

    /// Where downloads and extracted files are kept; `None` selects the platform cache directory
    pub cache_dir: Option<PathBuf>,

    /// Permit network access when the binary is neither installed nor cached
    pub allow_download: bool,

    /// Manifest index listing the published package versions
    pub manifest_index_url: String,

    /// User-Agent sent with every request (the GitHub API rejects requests without one)
    pub user_agent: String,

    /// Timeout for a single HTTP request, in seconds
    pub timeout_secs: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            explicit_path: None,
            well_known_path: PathBuf::from(WELL_KNOWN_PATH),
            cache_dir: None,
            allow_download: true,
            manifest_index_url: MANIFEST_INDEX_URL.to_string(),
            user_agent: concat!("privscope/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 300,
        }
    }
}

impl AcquireConfig {
    /// Creates a configuration that never touches the network
    ///
    /// Only the explicit path, the install location and the cache are consulted.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            allow_download: false,
            ..Self::default()
        }
    }

    /// Sets the path tried first
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Sets the cache directory
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Resolves the cache directory, without creating it
    ///
    /// Falls back to `.privscope-cache` in the working directory on platforms without a cache
    /// directory.
    #[must_use]
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }

        directories::ProjectDirs::from("rs", "binflip", "privscope")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".privscope-cache"))
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use privscope::{AcquireConfig, Acquirer, File, Fingerprint};
use serde::Serialize;

use crate::app::AcquireOptions;

/// Load and map a PE file.
pub fn load_file(path: &Path) -> anyhow::Result<File> {
    File::from_file(path).with_context(|| format!("failed to load PE file: {}", path.display()))
}

/// Translate the acquisition flags into a library configuration.
pub fn acquire_config(opts: &AcquireOptions) -> AcquireConfig {
    let mut config = if opts.no_download {
        AcquireConfig::offline()
    } else {
        AcquireConfig::default()
    };

    if let Some(dir) = &opts.cache_dir {
        config = config.with_cache_dir(dir);
    }
    config
}

/// Find the capture library on this machine, or download it.
pub fn locate_target(opts: &AcquireOptions) -> anyhow::Result<PathBuf> {
    Acquirer::new(acquire_config(opts))
        .locate()
        .context("failed to acquire _nvspcaps64.dll")
}

/// Serializable form of a [`Fingerprint`].
#[derive(Debug, Serialize)]
pub struct FingerprintInfo {
    pub size: usize,
    pub md5: String,
    pub sha1: String,
}

impl From<Fingerprint> for FingerprintInfo {
    fn from(fp: Fingerprint) -> Self {
        Self {
            size: fp.size,
            md5: fp.md5,
            sha1: fp.sha1,
        }
    }
}

/// A file that could not be processed.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub file: String,
    pub error: String,
}

/// Format an address or offset the way the rest of the output does.
pub fn hex32(value: u64) -> String {
    format!("0x{value:08x}")
}

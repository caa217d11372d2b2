//! Locating the capture library, downloading it if necessary.
//!
//! [`Acquirer::locate`] tries, in order:
//!
//! 1. the explicitly configured path,
//! 2. the GeForce Experience install location,
//! 3. a previously extracted copy in the cache directory,
//!
//! and, if downloads are allowed, falls back to the download chain:
//!
//! ```text
//! manifest index → gfe.exe → gfe.7z → _nvspcaps64.dll
//! ```
//!
//! Each artifact of the chain is kept in the cache directory and reused on the next run, so an
//! interrupted acquisition resumes at the step that failed. Artifacts are written under a
//! temporary name and renamed once complete.

pub mod archive;
pub mod fetch;
pub mod installer;
pub mod manifest;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{AcquireConfig, TARGET_NAME},
    Error, Result,
};

pub use archive::{ArchiveExtractor, SevenZip};
pub use fetch::{Fetch, HttpFetcher};

/// Cache file name of the downloaded installer.
pub const INSTALLER_NAME: &str = "gfe.exe";

/// Cache file name of the carved archive.
pub const ARCHIVE_NAME: &str = "gfe.7z";

/// Finds or fetches `_nvspcaps64.dll`.
pub struct Acquirer {
    config: AcquireConfig,
    fetcher: Box<dyn Fetch>,
    extractor: Box<dyn ArchiveExtractor>,
}

impl Acquirer {
    /// Creates an acquirer using HTTPS and the in-process 7z decoder.
    #[must_use]
    pub fn new(config: AcquireConfig) -> Self {
        let fetcher = Box::new(HttpFetcher::new(&config));
        let extractor = Box::new(SevenZip);

        Self::with_backends(config, fetcher, extractor)
    }

    /// Creates an acquirer with custom transport and archive backends.
    #[must_use]
    pub fn with_backends(
        config: AcquireConfig,
        fetcher: Box<dyn Fetch>,
        extractor: Box<dyn ArchiveExtractor>,
    ) -> Self {
        Acquirer {
            config,
            fetcher,
            extractor,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    /// Returns the cache directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the directory cannot be created.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let dir = self.config.resolved_cache_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Returns the path of the capture library, downloading it if necessary and allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BinaryNotFound`] if no local copy exists and downloads are disabled,
    /// otherwise any error of the download chain.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.explicit_path {
            if path.is_file() {
                log::debug!("using {}", path.display());
                return Ok(path.clone());
            }
            log::warn!("{} does not exist", path.display());
        }

        if self.config.well_known_path.is_file() {
            log::debug!("using installed {}", self.config.well_known_path.display());
            return Ok(self.config.well_known_path.clone());
        }

        let cached = self.config.resolved_cache_dir().join(TARGET_NAME);
        if cached.is_file() {
            log::debug!("using cached {}", cached.display());
            return Ok(cached);
        }

        if !self.config.allow_download {
            return Err(Error::BinaryNotFound(TARGET_NAME.to_string()));
        }

        self.download_chain(&self.cache_dir()?)
    }

    /// Runs the download chain inside `cache`, skipping every step whose artifact exists.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub fn download_chain(&self, cache: &Path) -> Result<PathBuf> {
        let installer = cache.join(INSTALLER_NAME);
        if installer.is_file() {
            log::debug!("installer cached at {}", installer.display());
        } else {
            let url = manifest::resolve_installer_url(
                self.fetcher.as_ref(),
                &self.config.manifest_index_url,
            )?;
            log::info!("Downloading GeForce Experience installer to {}", installer.display());
            write_atomically(&installer, |part| {
                let size = self.fetcher.download(&url, part)?;
                log::debug!("downloaded {size} bytes from {url}");
                Ok(())
            })?;
        }

        let archive = cache.join(ARCHIVE_NAME);
        if archive.is_file() {
            log::debug!("archive cached at {}", archive.display());
        } else {
            write_atomically(&archive, |part| {
                let size = installer::carve_archive(&installer, part)?;
                log::debug!("carved {size} byte archive out of {}", installer.display());
                Ok(())
            })?;
        }

        let target = cache.join(TARGET_NAME);
        if !target.is_file() {
            log::info!("Extracting {TARGET_NAME} from GeForce Experience to {}", target.display());
            let data = archive::extract_named(self.extractor.as_ref(), &archive, TARGET_NAME)?;
            write_atomically(&target, |part| Ok(fs::write(part, &data)?))?;
        }

        Ok(target)
    }
}

/// Produces `dest` through a temporary sibling that is renamed once `produce` succeeded.
fn write_atomically<F>(dest: &Path, produce: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    let part = PathBuf::from(name);

    if let Err(error) = produce(&part) {
        let _ = fs::remove_file(&part);
        return Err(error);
    }

    fs::rename(&part, dest)?;
    Ok(())
}

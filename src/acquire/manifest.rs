//! Resolution of the installer URL through the winget package manifests.
//!
//! The winget community repository keeps one directory per published version below the package
//! directory. The GitHub contents API lists those directories as JSON; each version directory
//! contains YAML manifests, the first of which names the installer download.

use serde::Deserialize;

use crate::{acquire::Fetch, Error, Result};

/// One entry of a GitHub contents API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoEntry {
    /// File or directory name
    pub name: String,
    /// Path relative to the repository root
    #[serde(default)]
    pub path: String,
    /// Raw download location; `null` for directories
    #[serde(default)]
    pub download_url: Option<String>,
    /// `"file"` or `"dir"`
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A winget manifest, reduced to the installer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WingetManifest {
    /// Package identifier
    #[serde(default)]
    pub package_identifier: Option<String>,
    /// Package version (`PackageVersion` in current schemas, `Version` in early ones)
    #[serde(default, alias = "Version")]
    pub package_version: Option<String>,
    /// Manifest-level default installer URL
    #[serde(default)]
    pub installer_url: Option<String>,
    /// Installer entries
    #[serde(default)]
    pub installers: Vec<WingetInstaller>,
}

/// One installer entry of a winget manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WingetInstaller {
    /// Target architecture (`Architecture`, or `Arch` in early schemas)
    #[serde(default, alias = "Arch")]
    pub architecture: Option<String>,
    /// Download location (`InstallerUrl`, or `Url` in early schemas)
    #[serde(default, alias = "Url")]
    pub installer_url: Option<String>,
    /// SHA-256 of the installer, as published
    #[serde(default, alias = "Sha256")]
    pub installer_sha256: Option<String>,
}

impl WingetManifest {
    /// Parses a YAML manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if the document is not a manifest.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// URL of the first installer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the manifest lists no installers, or if neither the first
    /// installer nor the manifest root carries a URL.
    pub fn installer_url(&self) -> Result<&str> {
        let Some(first) = self.installers.first() else {
            return Err(Error::Manifest("too few installer entries".to_string()));
        };

        first
            .installer_url
            .as_deref()
            .or(self.installer_url.as_deref())
            .ok_or_else(|| Error::Manifest("installer entry has no URL".to_string()))
    }
}

/// Parses a contents API listing.
///
/// # Errors
///
/// Returns [`Error::Json`] if the body is not a listing, which includes the error objects the
/// API returns when rate limited.
pub fn parse_listing(body: &[u8]) -> Result<Vec<RepoEntry>> {
    Ok(serde_json::from_slice(body)?)
}

/// Picks the newest version directory: the lexicographically greatest name.
///
/// # Errors
///
/// Returns [`Error::Manifest`] if the listing is empty.
pub fn pick_version(entries: &[RepoEntry]) -> Result<&str> {
    entries
        .iter()
        .map(|entry| entry.name.as_str())
        .max()
        .ok_or_else(|| Error::Manifest("too few contents entries".to_string()))
}

/// Picks the manifest to download from a version directory: its first entry.
///
/// # Errors
///
/// Returns [`Error::Manifest`] if the listing is empty or its first entry is not a file.
pub fn pick_download_url(entries: &[RepoEntry]) -> Result<&str> {
    let Some(first) = entries.first() else {
        return Err(Error::Manifest("too few contents entries".to_string()));
    };

    first.download_url.as_deref().ok_or_else(|| {
        Error::Manifest(format!("entry '{}' has no download URL", first.name))
    })
}

/// Walks the manifest index down to the installer URL of the newest version.
///
/// # Errors
///
/// Propagates transport errors from `fetcher`, and decoding or [`Error::Manifest`] errors from
/// each step.
pub fn resolve_installer_url(fetcher: &dyn Fetch, index_url: &str) -> Result<String> {
    let versions = parse_listing(&fetcher.get_bytes(index_url)?)?;
    let version = pick_version(&versions)?;
    log::debug!("newest published version is {version}");

    let version_url = format!("{}/{}", index_url.trim_end_matches('/'), version);
    let files = parse_listing(&fetcher.get_bytes(&version_url)?)?;
    let manifest_url = pick_download_url(&files)?;
    log::debug!("reading manifest {manifest_url}");

    let body = fetcher.get_bytes(manifest_url)?;
    let text = String::from_utf8_lossy(&body);
    let manifest = WingetManifest::parse(&text)?;

    Ok(manifest.installer_url()?.to_string())
}

//! HTTP transport for the download chain.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    time::Duration,
};

use crate::{config::AcquireConfig, Error, Result};

/// Retrieval of remote resources.
///
/// The acquisition chain only ever issues plain GET requests, either reading a small document
/// into memory or streaming a large one to disk.
pub trait Fetch: Send + Sync {
    /// Reads the resource at `url` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] on transport failures and non-success status codes.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Stores the resource at `url` in `dest`, returning the number of bytes written.
    ///
    /// The default implementation buffers the whole body in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] on transport failures, or [`Error::FileError`] if `dest`
    /// cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let body = self.get_bytes(url)?;
        fs::write(dest, &body)?;
        Ok(body.len() as u64)
    }
}

/// [`Fetch`] over HTTPS, backed by a `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Creates a fetcher with the timeout and User-Agent from `config`.
    #[must_use]
    pub fn new(config: &AcquireConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();

        HttpFetcher { agent }
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        self.agent.get(url).call().map_err(|error| Error::Download {
            url: url.to_string(),
            message: match error {
                ureq::Error::Status(code, response) => {
                    format!("HTTP {code} {}", response.status_text())
                }
                ureq::Error::Transport(transport) => transport.to_string(),
            },
        })
    }
}

impl Fetch for HttpFetcher {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {url}");
        let response = self.get(url)?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|error| Error::Download {
                url: url.to_string(),
                message: error.to_string(),
            })?;

        Ok(body)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        log::debug!("GET {url} -> {}", dest.display());
        let response = self.get(url)?;

        let mut out = fs::File::create(dest)?;
        let written = io::copy(&mut response.into_reader(), &mut out).map_err(|error| {
            Error::Download {
                url: url.to_string(),
                message: error.to_string(),
            }
        })?;

        Ok(written)
    }
}

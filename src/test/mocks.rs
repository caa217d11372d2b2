use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    acquire::{ArchiveExtractor, Fetch},
    Error, Result,
};

/// Serves canned bodies by URL and records every request.
pub struct MockFetch {
    bodies: HashMap<String, Vec<u8>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetch {
    pub fn new() -> Self {
        MockFetch {
            bodies: HashMap::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with(self, url: &str, body: &str) -> Self {
        self.with_bytes(url, body.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Shared handle on the request log, usable after the mock was moved into an acquirer.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for MockFetch {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| Error::Download {
            url: url.to_string(),
            message: "HTTP 404 Not Found".to_string(),
        })
    }
}

/// An archive with fixed entries, independent of the path it is asked about.
pub struct MockArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MockArchive {
    pub fn new() -> Self {
        MockArchive {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, path: &str, data: &[u8]) -> Self {
        self.entries.push((path.to_string(), data.to_vec()));
        self
    }
}

impl ArchiveExtractor for MockArchive {
    fn list(&self, _archive: &Path) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|(path, _)| path.clone()).collect())
    }

    fn read_entry(&self, _archive: &Path, entry: &str) -> Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(path, _)| path == entry)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Error::Archive(format!("no entry {entry}")))
    }
}

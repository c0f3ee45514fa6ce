//! # Payload Fetching
//!
//! Snapshot and classification payloads either ship inside the report or
//! are retrieved from a path named by the report manifest. Retrieval sits
//! behind [`PayloadFetcher`] so the viewer can plug in whatever transport it
//! has (HTTP, an archive, a test double). [`FsFetcher`] reads paths relative
//! to a base directory, which is how a report unpacked on disk is served.
//!
//! Every failure becomes a [`FetchFailure`] carrying the attempted path.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::FetchFailure;

/// Retrieves raw payload bytes by path.
pub trait PayloadFetcher {
    /// Fetch the payload stored at `path`.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchFailure>;
}

/// Fetch and decode a JSON payload. A decode error is reported as a fetch
/// failure for the same path.
pub fn fetch_json<T: DeserializeOwned>(
    fetcher: &dyn PayloadFetcher,
    path: &str,
) -> Result<T, FetchFailure> {
    let bytes = fetcher.fetch(path)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchFailure::new(path, format!("invalid JSON: {e}")))
}

/// Reads payloads from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    base_dir: Option<PathBuf>,
}

impl FsFetcher {
    /// Resolve relative paths against the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }
}

impl PayloadFetcher for FsFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchFailure> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|e| FetchFailure::new(path, e))
    }
}

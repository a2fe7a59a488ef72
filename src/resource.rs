//! Resource loading.
//!
//! A resource name is looked up under each configured root in order, then as
//! a plain filesystem path. The whole stream is read up to an explicit size
//! ceiling; anything larger is reported as [`MutagenError::Truncated`] rather
//! than cut short.

use crate::error::{MutagenError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default read ceiling for a single resource (1 MiB)
pub const DEFAULT_MAX_RESOURCE_BYTES: u64 = 1024 * 1024;

/// Locates and decodes mutation resources.
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    roots: Vec<PathBuf>,
    max_bytes: u64,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader {
    /// Loader with no roots: names are resolved as filesystem paths only.
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            max_bytes: DEFAULT_MAX_RESOURCE_BYTES,
        }
    }

    /// Add a root searched before the filesystem fallback
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Replace the read ceiling
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Resolve a name to an existing file.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.trim().is_empty() {
            return Err(MutagenError::not_found(name));
        }

        let relative = Path::new(name);
        if relative.is_relative() {
            for root in &self.roots {
                let candidate = root.join(relative);
                if candidate.is_file() {
                    debug!("Resolved {} under root {:?}", name, root);
                    return Ok(candidate);
                }
            }
        }

        if relative.is_file() {
            debug!("Resolved {} on the filesystem", name);
            return Ok(relative.to_path_buf());
        }

        Err(MutagenError::not_found(name))
    }

    /// Load a resource as UTF-8 text.
    ///
    /// Returns `Ok(None)` when the resource exists but holds zero bytes.
    pub fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| MutagenError::io(name, e))?;
        self.read_bounded(name, file)
    }

    /// Read a stream to completion, failing if it exceeds the ceiling.
    pub fn read_bounded<R: Read>(&self, name: &str, reader: R) -> Result<Option<String>> {
        let mut buf = Vec::new();
        // One extra byte distinguishes "exactly at the limit" from "over it"
        reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|e| MutagenError::io(name, e))?;

        if buf.len() as u64 > self.max_bytes {
            return Err(MutagenError::Truncated {
                resource: name.to_string(),
                limit: self.max_bytes,
            });
        }
        if buf.is_empty() {
            return Ok(None);
        }

        String::from_utf8(buf).map(Some).map_err(|e| {
            MutagenError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }
}

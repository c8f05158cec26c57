//! File system utility functions
//!
//! Mount-point directory handling with proper error reporting.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Create a single directory; fails if the path already exists
    #[instrument(skip(self))]
    pub fn create_dir<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        debug!("Creating directory: {}", path.display());
        fs::create_dir(path)
    }

    /// Remove a directory only if it exists and is empty
    ///
    /// Returns `Ok(true)` when the directory was removed, `Ok(false)` when it
    /// does not exist or still has entries.
    #[instrument(skip(self))]
    pub fn remove_dir_if_empty<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<bool> {
        let path = path.as_ref();

        if !path.is_dir() {
            debug!("Directory does not exist: {}", path.display());
            return Ok(false);
        }

        if fs::read_dir(path)?.next().is_some() {
            debug!("Directory is not empty: {}", path.display());
            return Ok(false);
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                debug!("Removed directory: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if a path exists and is a file
    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref().is_file()
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}

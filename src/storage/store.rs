//! File store
//!
//! The storage backend the dispatcher executes commands against. Files live
//! directly under one root directory and are addressed by bare filename.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{DepotError, Result};

/// Flat, filename-keyed file storage rooted at one directory.
///
/// ## Concurrency
/// - All methods take `&self`; the struct holds only the root path.
/// - Concurrent writes to the same filename race at the filesystem's
///   discretion (last writer wins), which is the documented contract.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the stored files
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at the given directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::info!("File store opened at {}", root.display());
        Ok(Self { root })
    }

    /// List stored filenames, sorted.
    ///
    /// Subdirectories and non-UTF-8 names are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut filenames = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                filenames.push(name);
            }
        }
        filenames.sort();
        Ok(filenames)
    }

    /// Read the contents of a stored file
    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.resolve(filename)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DepotError::FileNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a file, replacing any previous content under the same name
    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(filename)?;
        fs::write(&path, bytes)?;
        Ok(())
    }

    /// Delete a stored file
    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DepotError::FileNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Resolve a filename to its path under the root.
    ///
    /// The namespace is flat: separators, parent references, and empty names
    /// are rejected so a request can never address anything outside the root.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(DepotError::InvalidFilename(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }
}

//! Byte-oriented blob persistence keyed by storage key.
//!
//! The version store only ever saves, loads and deletes whole blobs.
//! [`MemoryBlobStore`] keeps them in process memory;
//! [`FsBlobStore`] writes one file per key under a root directory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Save/load/delete of opaque bytes.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Io`] if the write fails.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Fetch the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::NotFound`] if there is no such blob.
    fn load(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Remove the blob under `key`. Removing a missing key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Io`] if the removal fails.
    fn delete(&self, key: &str) -> Result<(), BlobError>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        (**self).save(key, bytes)
    }

    fn load(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        (**self).load(key)
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        (**self).delete(key)
    }
}

/// In-process blob map. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.read().contains_key(key)
    }
}

impl BlobStore for MemoryBlobStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.blobs.write().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_owned()))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.blobs.write().remove(key);
        Ok(())
    }
}

/// One file per key under `root`.
///
/// Writes go to `<key>.tmp` first and are renamed into place, so a
/// reader never sees a half-written blob under a live key.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Io`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<(), BlobError> {
        std::fs::create_dir_all(&self.root).map_err(|source| BlobError::Io {
            key: self.root.display().to_string(),
            source,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for `key`. Keys are generated by the store and never
    /// contain path separators.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl BlobStore for FsBlobStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let io_err = |source: io::Error| BlobError::Io {
            key: key.to_owned(),
            source,
        };
        let path = self.path_for(key);
        let tmp = self.path_for(&format!("{key}.tmp"));
        std::fs::write(&tmp, bytes).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }

    fn load(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        std::fs::read(self.path_for(key)).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => BlobError::NotFound(key.to_owned()),
            _ => BlobError::Io {
                key: key.to_owned(),
                source,
            },
        })
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(BlobError::Io {
                key: key.to_owned(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

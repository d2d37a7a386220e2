//! Per-entity version histories over a [`BlobStore`].
//!
//! # Locking
//!
//! ```text
//! entities: RwLock<HashMap<id, Arc<RwLock<History>>>>
//!           ^ write-locked only to insert a new id
//!                                  ^ write-locked for create/commit/undo/redo
//! ```
//!
//! The map lock is never requested while an entity lock is held, and
//! images are encoded before any lock is taken. Mutations on different
//! ids therefore never wait on each other beyond the brief map insert.
//!
//! A version becomes visible only once its blob has been saved and the
//! history updated under the entity lock; a failed save leaves the
//! history untouched. Blob reads happen under the entity read lock, so
//! they never observe a blob that a branch cut is deleting or reusing.
//!
//! Histories live in process memory and are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slurp_filters::{ImageFormat, RgbaImage, codec};

use crate::backend::BlobStore;
use crate::error::StoreError;
use crate::history::{History, HistorySnapshot};
use crate::version::ImageVersion;

type Entity = Arc<RwLock<History>>;

pub struct VersionStore<B> {
    backend: B,
    format: ImageFormat,
    entities: RwLock<HashMap<String, Entity>>,
}

impl<B: BlobStore> VersionStore<B> {
    /// Create an empty store that persists versions as `format`.
    #[must_use]
    pub fn new(backend: B, format: ImageFormat) -> Self {
        Self {
            backend,
            format,
            entities: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Encoding used for persisted versions.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    fn entity(&self, entity_id: &str) -> Option<Entity> {
        self.entities.read().get(entity_id).cloned()
    }

    fn entity_or_insert(&self, entity_id: &str) -> Entity {
        if let Some(entity) = self.entity(entity_id) {
            return entity;
        }
        Arc::clone(
            self.entities
                .write()
                .entry(entity_id.to_owned())
                .or_default(),
        )
    }

    /// Store `image` as version 0 of a new entity.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if the entity has any history.
    /// - [`StoreError::Codec`] if the image cannot be encoded.
    /// - [`StoreError::Blob`] if the backend rejects the write.
    pub fn create_initial(
        &self,
        entity_id: &str,
        image: &RgbaImage,
    ) -> Result<ImageVersion, StoreError> {
        let bytes = codec::encode(image, self.format)?;

        let entity = self.entity_or_insert(entity_id);
        let mut history = entity.write();
        if !history.is_empty() {
            return Err(StoreError::AlreadyExists(entity_id.to_owned()));
        }
        let version = self.append(entity_id, &mut history, &bytes)?;
        tracing::info!(entity_id, key = %version.storage_key, "created image");
        Ok(version)
    }

    /// Append `image` after the current version, discarding any
    /// versions that were undone.
    ///
    /// An unknown entity gets `image` as its version 0.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Codec`] if the image cannot be encoded.
    /// - [`StoreError::Blob`] if the backend rejects the write.
    pub fn commit(&self, entity_id: &str, image: &RgbaImage) -> Result<ImageVersion, StoreError> {
        let bytes = codec::encode(image, self.format)?;

        let entity = self.entity_or_insert(entity_id);
        let mut history = entity.write();
        if history.is_empty() {
            tracing::debug!(entity_id, "commit on unknown image starts a new history");
        }
        let version = self.append(entity_id, &mut history, &bytes)?;
        tracing::info!(
            entity_id,
            version = version.version_index,
            "committed version"
        );
        Ok(version)
    }

    /// Save then push. Called with the entity lock held.
    fn append(
        &self,
        entity_id: &str,
        history: &mut History,
        bytes: &[u8],
    ) -> Result<ImageVersion, StoreError> {
        let version = ImageVersion::new(entity_id, history.next_index(), self.format);
        self.backend.save(&version.storage_key, bytes)?;

        let discarded = history.push(version.clone());
        if !discarded.is_empty() {
            tracing::info!(
                entity_id,
                discarded = discarded.len(),
                "new edit discarded redo branch"
            );
        }
        for old in discarded
            .iter()
            .filter(|old| old.storage_key != version.storage_key)
        {
            if let Err(e) = self.backend.delete(&old.storage_key) {
                tracing::warn!(key = %old.storage_key, error = %e, "failed to delete discarded version");
            }
        }
        Ok(version)
    }

    /// Move the current pointer back one version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NothingToUndo`] at version 0 or for an
    /// unknown entity.
    pub fn undo(&self, entity_id: &str) -> Result<ImageVersion, StoreError> {
        let nothing = || StoreError::NothingToUndo(entity_id.to_owned());
        let entity = self.entity(entity_id).ok_or_else(nothing)?;
        let mut history = entity.write();
        let version = history.undo().cloned().ok_or_else(nothing)?;
        tracing::debug!(entity_id, version = version.version_index, "undo");
        Ok(version)
    }

    /// Move the current pointer forward one version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NothingToRedo`] at the newest version or
    /// for an unknown entity.
    pub fn redo(&self, entity_id: &str) -> Result<ImageVersion, StoreError> {
        let nothing = || StoreError::NothingToRedo(entity_id.to_owned());
        let entity = self.entity(entity_id).ok_or_else(nothing)?;
        let mut history = entity.write();
        let version = history.redo().cloned().ok_or_else(nothing)?;
        tracing::debug!(entity_id, version = version.version_index, "redo");
        Ok(version)
    }

    /// Descriptor of the current version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown entity.
    pub fn current_version(&self, entity_id: &str) -> Result<ImageVersion, StoreError> {
        self.entity(entity_id)
            .and_then(|entity| entity.read().current().cloned())
            .ok_or_else(|| StoreError::NotFound(entity_id.to_owned()))
    }

    /// Descriptor of version `index`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] for an unknown entity.
    /// - [`StoreError::VersionNotFound`] if `index` is past the end.
    pub fn version(&self, entity_id: &str, index: usize) -> Result<ImageVersion, StoreError> {
        let entity = self
            .entity(entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.to_owned()))?;
        let history = entity.read();
        pick_version(entity_id, &history, index).cloned()
    }

    /// Snapshot of the whole history and the current pointer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown entity.
    pub fn versions(&self, entity_id: &str) -> Result<HistorySnapshot, StoreError> {
        let entity = self
            .entity(entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.to_owned()))?;
        let history = entity.read();
        if history.is_empty() {
            return Err(StoreError::NotFound(entity_id.to_owned()));
        }
        Ok(HistorySnapshot::of(entity_id, &history))
    }

    /// Stored bytes of the current version.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] for an unknown entity.
    /// - [`StoreError::Blob`] if the backend cannot produce the blob.
    pub fn load_current_bytes(&self, entity_id: &str) -> Result<Vec<u8>, StoreError> {
        self.load_blob(entity_id, |history| {
            history
                .current()
                .ok_or_else(|| StoreError::NotFound(entity_id.to_owned()))
        })
    }

    /// Decoded current version.
    ///
    /// # Errors
    ///
    /// As for [`load_current_bytes`](Self::load_current_bytes), plus
    /// [`StoreError::Codec`] if the blob does not decode.
    pub fn load_current(&self, entity_id: &str) -> Result<RgbaImage, StoreError> {
        let bytes = self.load_current_bytes(entity_id)?;
        Ok(codec::decode(&bytes)?)
    }

    /// Decoded version `index`.
    ///
    /// # Errors
    ///
    /// As for [`version`](Self::version), plus backend and decode
    /// failures.
    pub fn load_version(&self, entity_id: &str, index: usize) -> Result<RgbaImage, StoreError> {
        let bytes = self.load_blob(entity_id, |history| {
            pick_version(entity_id, history, index)
        })?;
        Ok(codec::decode(&bytes)?)
    }

    /// Load the blob of the version `pick` selects.
    ///
    /// The entity read lock is held through the backend read, so a
    /// concurrent branch cut can neither delete nor overwrite the blob
    /// mid-load. Readers still share the lock.
    fn load_blob(
        &self,
        entity_id: &str,
        pick: impl FnOnce(&History) -> Result<&ImageVersion, StoreError>,
    ) -> Result<Vec<u8>, StoreError> {
        let entity = self
            .entity(entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.to_owned()))?;
        let history = entity.read();
        let version = pick(&history)?;
        Ok(self.backend.load(&version.storage_key)?)
    }
}

fn pick_version<'h>(
    entity_id: &str,
    history: &'h History,
    index: usize,
) -> Result<&'h ImageVersion, StoreError> {
    if history.is_empty() {
        return Err(StoreError::NotFound(entity_id.to_owned()));
    }
    history.get(index).ok_or_else(|| StoreError::VersionNotFound {
        entity_id: entity_id.to_owned(),
        index,
    })
}

use crate::backend::BlobError;

/// Errors from the version store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("image {0} already exists")]
    AlreadyExists(String),

    #[error("image {0} not found")]
    NotFound(String),

    #[error("nothing to undo for image {0}")]
    NothingToUndo(String),

    #[error("nothing to redo for image {0}")]
    NothingToRedo(String),

    #[error("image {entity_id} has no version {index}")]
    VersionNotFound { entity_id: String, index: usize },

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Codec(#[from] slurp_filters::CodecError),
}

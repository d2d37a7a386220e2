//! Immutable version descriptors.

use serde::{Deserialize, Serialize};

use slurp_filters::ImageFormat;

/// One committed snapshot of an entity.
///
/// Serialises as `{"uuid", "version", "filePath"}`, the descriptor the
/// HTTP surface returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageVersion {
    #[serde(rename = "uuid")]
    pub entity_id: String,
    #[serde(rename = "version")]
    pub version_index: usize,
    #[serde(rename = "filePath")]
    pub storage_key: String,
}

impl ImageVersion {
    pub(crate) fn new(entity_id: &str, version_index: usize, format: ImageFormat) -> Self {
        Self {
            entity_id: entity_id.to_owned(),
            version_index,
            storage_key: storage_key(entity_id, version_index, format),
        }
    }
}

/// Backend key for a version: `<entity>__v<index>.<ext>`.
#[must_use]
pub fn storage_key(entity_id: &str, version_index: usize, format: ImageFormat) -> String {
    format!("{entity_id}__v{version_index}.{}", format.extension())
}

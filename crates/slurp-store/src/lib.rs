//! slurp-store: per-image version history with undo/redo.
//!
//! Every image is an *entity* with a linear list of versions and a
//! current pointer. Committing after an undo discards the undone
//! versions, as in an editor's undo stack. Version bytes are kept in a
//! pluggable [`BlobStore`]; the history itself is in memory only.

pub mod backend;
mod error;
pub mod history;
mod store;
pub mod version;

pub use backend::{BlobError, BlobStore, FsBlobStore, MemoryBlobStore};
pub use error::StoreError;
pub use history::HistorySnapshot;
pub use store::VersionStore;
pub use version::{ImageVersion, storage_key};

use std::sync::Arc;

use slurp_filters::ImageFormat;
use slurp_store::{BlobStore, FsBlobStore, MemoryBlobStore, VersionStore};

use crate::config::Config;
use crate::scanner::{HttpScanner, Scanner};

pub type Store = VersionStore<Box<dyn BlobStore>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub scanner: Option<Arc<dyn Scanner>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Default body limit when none is configured: 20 MiB.
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

    #[must_use]
    pub fn new(store: Store, scanner: Option<Arc<dyn Scanner>>) -> Self {
        Self {
            store: Arc::new(store),
            scanner,
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// In-memory store, no scanner.
    #[must_use]
    pub fn in_memory(format: ImageFormat) -> Self {
        let backend: Box<dyn BlobStore> = Box::new(MemoryBlobStore::new());
        Self::new(VersionStore::new(backend, format), None)
    }

    /// Build the state described by `config`, creating the storage
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Fails if the storage directory cannot be created or the scanner
    /// client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend: Box<dyn BlobStore> = match &config.storage_dir {
            Some(dir) => {
                let fs = FsBlobStore::new(dir);
                fs.ensure_dir()?;
                tracing::info!(dir = %dir.display(), "storing versions on disk");
                Box::new(fs)
            }
            None => {
                tracing::info!("storing versions in memory");
                Box::new(MemoryBlobStore::new())
            }
        };

        let scanner = match &config.scanner_url {
            Some(url) => {
                let scanner: Arc<dyn Scanner> =
                    Arc::new(HttpScanner::new(url.clone(), config.scanner_timeout())?);
                Some(scanner)
            }
            None => {
                tracing::warn!("no scanner configured, POST /image/scan will fail");
                None
            }
        };

        let store = VersionStore::new(backend, config.storage_format.into());
        Ok(Self {
            max_upload_bytes: config.max_upload_bytes,
            ..Self::new(store, scanner)
        })
    }
}

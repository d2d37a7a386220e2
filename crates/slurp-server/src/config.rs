//! Command-line and environment configuration for `slurpd`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use slurp_filters::ImageFormat;

/// Versioned image store with a filter pipeline, served over HTTP.
///
/// Every flag can also be set through the environment variable shown
/// in `--help`.
#[derive(Debug, Clone, Parser)]
#[command(name = "slurpd", version)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "SLURP_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Directory for persisted versions. Versions are kept in memory
    /// when unset.
    #[arg(long, env = "SLURP_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Encoding for persisted versions.
    #[arg(long, env = "SLURP_STORAGE_FORMAT", value_enum, default_value_t = StorageFormat::Png)]
    pub storage_format: StorageFormat,

    /// Perspective-correction service used by `POST /image/scan`.
    #[arg(long, env = "SLURP_SCANNER_URL")]
    pub scanner_url: Option<String>,

    /// Timeout for one scanner request, in seconds.
    #[arg(long, env = "SLURP_SCANNER_TIMEOUT_SECS", default_value_t = 30)]
    pub scanner_timeout_secs: u64,

    /// Request body limit for uploads, in bytes.
    #[arg(long, env = "SLURP_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    #[arg(long, env = "SLURP_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    #[must_use]
    pub const fn scanner_timeout(&self) -> Duration {
        Duration::from_secs(self.scanner_timeout_secs)
    }
}

/// Storage encoding selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageFormat {
    /// Lossless, keeps alpha.
    Png,
    /// Lossy, drops alpha.
    Jpeg,
}

impl From<StorageFormat> for ImageFormat {
    fn from(format: StorageFormat) -> Self {
        match format {
            StorageFormat::Png => Self::Png,
            StorageFormat::Jpeg => Self::Jpeg,
        }
    }
}

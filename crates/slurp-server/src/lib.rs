//! slurp-server: HTTP surface over the slurp version store.
//!
//! The binary is `slurpd`; the library half exists so integration
//! tests can build the router directly.

pub mod api;
pub mod config;
pub mod error;
pub mod scanner;
pub mod state;
pub mod telemetry;

pub use api::router;
pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

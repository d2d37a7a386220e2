//! slurp-filters: named image filters and their pipeline (sans-IO).
//!
//! Turns caller-supplied filter requests into validated operations and
//! runs them over an RGBA image:
//!
//! ```text
//! FilterSpec { filter, params }  --registry::resolve-->  FilterOperation
//! [FilterOperation]              --pipeline::apply--->   RgbaImage -> RgbaImage
//! ```
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! images and byte slices; storage and HTTP live in `slurp-store` and
//! `slurp-server`.

pub mod blur;
pub mod codec;
pub mod color;
pub mod geometry;
pub mod neighborhood;
pub mod operation;
pub mod pipeline;
pub mod presets;
pub mod registry;
pub mod scanify;
pub mod tone;
pub mod types;

pub use codec::{CodecError, ImageFormat};
pub use operation::{Filter, FilterOperation, Window};
pub use pipeline::Pipeline;
pub use types::{Anchor, FilterError, FilterSpec, Interpolation, RgbaImage};

/// Resolve `specs` and run them over `source` in order.
///
/// Validation happens for the whole list before any pixel work, so an
/// invalid spec anywhere in the list means nothing is rendered.
///
/// # Errors
///
/// Returns the first validation error, or the first render-time error.
pub fn apply_specs(source: &RgbaImage, specs: &[FilterSpec]) -> Result<RgbaImage, FilterError> {
    Pipeline::from_specs(specs)?.apply(source)
}

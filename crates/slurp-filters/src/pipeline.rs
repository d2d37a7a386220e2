//! Ordered composition of filter operations.
//!
//! Operations run strictly left to right; each one's output is the next
//! one's input. Composition is **not** commutative:
//!
//! ```rust
//! # use slurp_filters::{FilterOperation, Pipeline, RgbaImage};
//! # fn run(source: &RgbaImage) -> Result<(), slurp_filters::FilterError> {
//! let a = Pipeline::new(vec![FilterOperation::Grayscale, FilterOperation::Invert]);
//! let b = Pipeline::new(vec![FilterOperation::Invert, FilterOperation::Grayscale]);
//! let (out_a, out_b) = (a.apply(source)?, b.apply(source)?);
//! // `out_a` and `out_b` are each deterministic, but need not be equal.
//! # Ok(())
//! # }
//! ```
//!
//! The source image is borrowed and never modified. If any operation
//! fails, the whole call fails and no partial output is returned.

use crate::operation::{Filter, FilterOperation};
use crate::registry;
use crate::types::{FilterError, FilterSpec, RgbaImage};

/// A validated, ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    operations: Vec<FilterOperation>,
}

impl Pipeline {
    #[must_use]
    pub const fn new(operations: Vec<FilterOperation>) -> Self {
        Self { operations }
    }

    /// Resolve every spec through the registry.
    ///
    /// # Errors
    ///
    /// Returns the first validation error from
    /// [`registry::resolve`](crate::registry::resolve).
    pub fn from_specs(specs: &[FilterSpec]) -> Result<Self, FilterError> {
        registry::resolve_all(specs).map(Self::new)
    }

    #[must_use]
    pub fn operations(&self) -> &[FilterOperation] {
        &self.operations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run the operations against `source`.
    ///
    /// # Errors
    ///
    /// Returns the first render-time failure.
    pub fn apply(&self, source: &RgbaImage) -> Result<RgbaImage, FilterError> {
        apply(source, &self.operations)
    }
}

/// Apply `operations` to `source` in order.
///
/// An empty list returns a copy of the source.
///
/// # Errors
///
/// Returns the first render-time failure; later operations are not run.
pub fn apply(source: &RgbaImage, operations: &[FilterOperation]) -> Result<RgbaImage, FilterError> {
    let Some((first, rest)) = operations.split_first() else {
        return Ok(source.clone());
    };
    rest.iter()
        .try_fold(first.apply(source)?, |image, op| op.apply(&image))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;
    use serde_json::json;

    use super::*;
    use crate::operation::Window;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(16, 12, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgba([(x * 16) as u8, (y * 20) as u8, ((x + y) * 7) as u8, 200])
        })
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let img = gradient();
        assert_eq!(apply(&img, &[]).unwrap(), img);
        assert!(Pipeline::default().is_empty());
    }

    #[test]
    fn same_input_same_output() {
        let img = gradient();
        let pipeline = Pipeline::new(vec![
            FilterOperation::GaussianBlur { sigma: 1.2 },
            FilterOperation::Contrast { percentage: 40.0 },
            FilterOperation::Rotate {
                angle: 33.0,
                interpolation: crate::Interpolation::Cubic,
            },
            FilterOperation::Median(Window {
                radius: 1,
                alpha: true,
            }),
            FilterOperation::Scanify,
        ]);
        let a = pipeline.apply(&img).unwrap();
        let b = pipeline.apply(&img).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn each_order_is_deterministic() {
        let img = gradient();
        let gi = [FilterOperation::Grayscale, FilterOperation::Invert];
        let ig = [FilterOperation::Invert, FilterOperation::Grayscale];
        assert_eq!(apply(&img, &gi).unwrap(), apply(&img, &gi).unwrap());
        assert_eq!(apply(&img, &ig).unwrap(), apply(&img, &ig).unwrap());
    }

    #[test]
    fn order_matters() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let enlarge_then_crop = [
            FilterOperation::Resize {
                width: 4,
                height: 4,
            },
            FilterOperation::Crop {
                x: 2,
                y: 2,
                width: 2,
                height: 2,
            },
        ];
        assert!(apply(&img, &enlarge_then_crop).is_ok());
        let reversed: Vec<_> = enlarge_then_crop.iter().rev().cloned().collect();
        assert!(apply(&img, &reversed).is_err());
    }

    #[test]
    fn failure_midway_fails_the_whole_call() {
        let img = gradient();
        let before = img.clone();
        let ops = [
            FilterOperation::Invert,
            FilterOperation::Crop {
                x: 10,
                y: 0,
                width: 10,
                height: 1,
            },
            FilterOperation::Grayscale,
        ];
        assert!(matches!(
            apply(&img, &ops),
            Err(FilterError::Render { filter: "crop", .. })
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn from_specs_resolves_in_order() {
        let specs: Vec<FilterSpec> = serde_json::from_value(json!([
            {"filter": "grayscale"},
            {"filter": "brightness", "params": {"percentage": 10}},
            {"filter": "invert", "params": null},
        ]))
        .unwrap();
        let pipeline = Pipeline::from_specs(&specs).unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline
                .operations()
                .iter()
                .map(FilterOperation::name)
                .collect::<Vec<_>>(),
            ["grayscale", "brightness", "invert"]
        );
    }

    #[test]
    fn grayscale_then_invert_matches_manual_composition() {
        let img = gradient();
        let composed = apply(&img, &[FilterOperation::Grayscale, FilterOperation::Invert]).unwrap();
        let manual = crate::tone::invert(&crate::color::grayscale(&img));
        assert_eq!(composed, manual);
    }
}

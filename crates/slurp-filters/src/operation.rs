//! Validated, typed filter operations.
//!
//! [`FilterOperation`] is the closed set of transformations the
//! pipeline can run. Values are normally built by
//! [`registry::resolve`](crate::registry::resolve), which guarantees the
//! parameters passed each variant's validation rule; constructing one
//! by hand skips that check.
//!
//! # Strategy pattern
//!
//! [`Filter`] is the "apply to an image" capability. The enum
//! implements it by dispatching to the per-filter functions in the
//! [`color`](crate::color), [`tone`](crate::tone),
//! [`geometry`](crate::geometry), [`blur`](crate::blur),
//! [`neighborhood`](crate::neighborhood) and [`scanify`](crate::scanify)
//! modules.

use crate::neighborhood::WindowStat;
use crate::types::{Anchor, FilterError, Interpolation, RgbaImage};

/// Parameters shared by the mean/median/minimum/maximum filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Window half-size; the window side is `2 * radius + 1`.
    pub radius: u32,
    /// Whether the alpha channel is filtered too.
    pub alpha: bool,
}

/// One validated filter, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperation {
    Resize {
        width: u32,
        height: u32,
    },
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    CropToSize {
        width: u32,
        height: u32,
        anchor: Anchor,
    },
    Rotate {
        /// Degrees, counter-clockwise.
        angle: f32,
        interpolation: Interpolation,
    },
    Brightness {
        percentage: f32,
    },
    Contrast {
        percentage: f32,
    },
    Saturation {
        percentage: f32,
    },
    Gamma {
        gamma: f32,
    },
    GaussianBlur {
        sigma: f32,
    },
    UnsharpMask {
        sigma: f32,
        amount: f32,
        threshold: f32,
    },
    Sigmoid {
        contrast: f32,
        midpoint: f32,
    },
    Pixelate {
        size: u32,
    },
    Colorize {
        hue: f32,
        saturation: f32,
        value: f32,
    },
    Sepia {
        percentage: f32,
    },
    Mean(Window),
    Median(Window),
    Minimum(Window),
    Maximum(Window),
    Hue {
        angle: f32,
    },
    ColorBalance {
        red: f32,
        green: f32,
        blue: f32,
    },
    Grayscale,
    Invert,
    Rotate180,
    Scanify,
}

impl FilterOperation {
    /// Registry name of this operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Crop { .. } => "crop",
            Self::CropToSize { .. } => "croptosize",
            Self::Rotate { .. } => "rotate",
            Self::Brightness { .. } => "brightness",
            Self::Contrast { .. } => "contrast",
            Self::Saturation { .. } => "saturation",
            Self::Gamma { .. } => "gamma",
            Self::GaussianBlur { .. } => "gaussianblur",
            Self::UnsharpMask { .. } => "unsharpmask",
            Self::Sigmoid { .. } => "sigmoid",
            Self::Pixelate { .. } => "pixelate",
            Self::Colorize { .. } => "colorize",
            Self::Sepia { .. } => "sepia",
            Self::Mean(_) => "mean",
            Self::Median(_) => "median",
            Self::Minimum(_) => "minimum",
            Self::Maximum(_) => "maximum",
            Self::Hue { .. } => "hue",
            Self::ColorBalance { .. } => "colorbalance",
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
            Self::Rotate180 => "rotate180",
            Self::Scanify => "scanify",
        }
    }
}

/// Something that turns one image into another.
pub trait Filter {
    /// Apply the transformation. The input is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Render`] when the parameters cannot be
    /// applied to this particular image.
    fn apply(&self, image: &RgbaImage) -> Result<RgbaImage, FilterError>;
}

impl Filter for FilterOperation {
    fn apply(&self, image: &RgbaImage) -> Result<RgbaImage, FilterError> {
        use crate::{blur, color, geometry, neighborhood, scanify, tone};

        let out = match *self {
            Self::Resize { width, height } => geometry::resize(image, width, height)?,
            Self::Crop {
                x,
                y,
                width,
                height,
            } => geometry::crop(image, x, y, width, height)?,
            Self::CropToSize {
                width,
                height,
                anchor,
            } => geometry::crop_to_size(image, width, height, anchor),
            Self::Rotate {
                angle,
                interpolation,
            } => geometry::rotate(image, angle, interpolation)?,
            Self::Brightness { percentage } => tone::brightness(image, percentage),
            Self::Contrast { percentage } => tone::contrast(image, percentage),
            Self::Saturation { percentage } => color::saturation(image, percentage),
            Self::Gamma { gamma } => tone::gamma(image, gamma),
            Self::GaussianBlur { sigma } => blur::gaussian_blur(image, sigma),
            Self::UnsharpMask {
                sigma,
                amount,
                threshold,
            } => blur::unsharp_mask(image, sigma, amount, threshold),
            Self::Sigmoid { contrast, midpoint } => tone::sigmoid(image, contrast, midpoint),
            Self::Pixelate { size } => neighborhood::pixelate(image, size),
            Self::Colorize {
                hue,
                saturation,
                value,
            } => color::colorize(image, hue, saturation, value),
            Self::Sepia { percentage } => color::sepia(image, percentage),
            Self::Mean(w) => window(image, WindowStat::Mean, w),
            Self::Median(w) => window(image, WindowStat::Median, w),
            Self::Minimum(w) => window(image, WindowStat::Minimum, w),
            Self::Maximum(w) => window(image, WindowStat::Maximum, w),
            Self::Hue { angle } => color::hue(image, angle),
            Self::ColorBalance { red, green, blue } => {
                color::color_balance(image, red, green, blue)
            }
            Self::Grayscale => color::grayscale(image),
            Self::Invert => tone::invert(image),
            Self::Rotate180 => geometry::rotate_180(image),
            Self::Scanify => scanify::scanify(image),
        };
        Ok(out)
    }
}

fn window(image: &RgbaImage, stat: WindowStat, window: Window) -> RgbaImage {
    crate::neighborhood::window_filter(image, stat, window.radius, window.alpha)
}

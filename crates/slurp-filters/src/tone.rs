//! Tonal adjustments driven by a 256-entry lookup table.
//!
//! Each filter here is a function of a single channel value, so it is
//! evaluated once per possible 8-bit input and then applied to the R, G
//! and B channels of every pixel. Alpha is left untouched.

use image::Rgba;
use imageproc::map::map_pixels;

use crate::color::{from_unit, to_unit};
use crate::types::RgbaImage;

type Lut = [u8; 256];

fn build_lut(f: impl Fn(f32) -> f32) -> Lut {
    std::array::from_fn(|i| {
        #[allow(clippy::cast_possible_truncation)]
        let v = i as u8;
        from_unit(f(to_unit(v)))
    })
}

fn apply_lut(image: &RgbaImage, lut: &Lut) -> RgbaImage {
    map_pixels(image, |Rgba([r, g, b, a])| {
        Rgba([lut[usize::from(r)], lut[usize::from(g)], lut[usize::from(b)], a])
    })
}

/// Shift every channel by `percentage / 100` of full scale.
#[must_use = "returns the adjusted image"]
pub fn brightness(image: &RgbaImage, percentage: f32) -> RgbaImage {
    let shift = percentage / 100.0;
    apply_lut(image, &build_lut(|v| v + shift))
}

/// Stretch (positive) or compress (negative) values around mid-gray.
///
/// At +100 the curve degenerates into a hard threshold at 0.5.
#[must_use = "returns the adjusted image"]
pub fn contrast(image: &RgbaImage, percentage: f32) -> RgbaImage {
    let factor = 1.0 + percentage / 100.0;
    let lut = build_lut(|v| {
        if factor <= 1.0 {
            (v - 0.5).mul_add(factor, 0.5)
        } else if factor < 2.0 {
            (v - 0.5).mul_add(1.0 / (2.0 - factor), 0.5)
        } else if v < 0.5 {
            0.0
        } else {
            1.0
        }
    });
    apply_lut(image, &lut)
}

/// Gamma correction: `v^(1/gamma)`. `gamma` must be positive.
#[must_use = "returns the adjusted image"]
pub fn gamma(image: &RgbaImage, gamma: f32) -> RgbaImage {
    let exponent = 1.0 / gamma;
    apply_lut(image, &build_lut(|v| v.powf(exponent)))
}

/// Non-linear contrast using a logistic curve centred on `midpoint`,
/// normalised so that 0 and 1 map to themselves.
///
/// `contrast` must be positive and `midpoint` within `[0, 1]`.
#[must_use = "returns the adjusted image"]
pub fn sigmoid(image: &RgbaImage, contrast: f32, midpoint: f32) -> RgbaImage {
    let logistic = |x: f32| 1.0 / (1.0 + (contrast * (midpoint - x)).exp());
    let low = logistic(0.0);
    let high = logistic(1.0);
    let span = high - low;
    let lut = build_lut(|v| {
        if span <= f32::EPSILON {
            v
        } else {
            (logistic(v) - low) / span
        }
    });
    apply_lut(image, &lut)
}

/// Negate every colour channel: `255 - v`.
#[must_use = "returns the inverted image"]
pub fn invert(image: &RgbaImage) -> RgbaImage {
    let lut: Lut = std::array::from_fn(|i| {
        #[allow(clippy::cast_possible_truncation)]
        let v = i as u8;
        !v
    });
    apply_lut(image, &lut)
}

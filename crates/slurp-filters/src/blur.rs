//! Gaussian blur and unsharp masking.
//!
//! `imageproc`'s blur works on one gray channel, so RGBA images are
//! split into planes, blurred plane by plane and merged again.

use image::{GrayImage, Luma, Rgba};

use crate::color::{from_unit, to_unit};
use crate::types::RgbaImage;

/// Split an RGBA image into its R, G, B and A planes.
pub(crate) fn split_channels(image: &RgbaImage) -> [GrayImage; 4] {
    let (w, h) = image.dimensions();
    std::array::from_fn(|c| GrayImage::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y).0[c]])))
}

/// Inverse of [`split_channels`]. All planes must share one size.
pub(crate) fn merge_channels(planes: &[GrayImage; 4]) -> RgbaImage {
    let (w, h) = planes[0].dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba(std::array::from_fn(|c| planes[c].get_pixel(x, y).0[0]))
    })
}

/// Gaussian blur of every channel, alpha included.
///
/// `sigma <= 0` returns the image unchanged; `imageproc` would panic.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let planes = split_channels(image);
    merge_channels(&planes.each_ref().map(|plane| imageproc::filter::gaussian_blur_f32(plane, sigma)))
}

/// Sharpen by adding back the difference between the image and its
/// blurred copy.
///
/// For each colour channel `d = (v - blur(v)) * amount` (normalised to
/// `[0, 1]`); the pixel becomes `v + d` where `|d| > threshold` and is
/// left alone otherwise. Alpha is untouched.
#[must_use = "returns the sharpened image"]
pub fn unsharp_mask(image: &RgbaImage, sigma: f32, amount: f32, threshold: f32) -> RgbaImage {
    let blurred = gaussian_blur(image, sigma);
    let mut out = image.clone();
    for (pixel, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let v = to_unit(pixel.0[c]);
            let d = (v - to_unit(soft.0[c])) * amount;
            if d.abs() > threshold {
                pixel.0[c] = from_unit(v + d);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Opaque black on the left, transparent white on the right.
    fn split_alpha() -> RgbaImage {
        RgbaImage::from_fn(12, 6, |x, _| {
            if x < 6 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        })
    }

    #[test]
    fn channels_split_and_merge_back() {
        let img = RgbaImage::from_fn(5, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgba([x as u8, y as u8, (x * y) as u8, 200 - x as u8])
        });
        let planes = split_channels(&img);
        assert_eq!(planes[3].get_pixel(4, 0).0[0], 196);
        assert_eq!(merge_channels(&planes), img);
    }

    #[test]
    fn non_positive_sigma_is_identity() {
        let img = split_alpha();
        assert_eq!(gaussian_blur(&img, 0.0), img);
        assert_eq!(gaussian_blur(&img, -2.5), img);
    }

    #[test]
    fn blur_softens_the_alpha_edge_too() {
        let out = gaussian_blur(&split_alpha(), 1.5);
        assert_eq!(out.dimensions(), (12, 6));
        let left = out.get_pixel(5, 3).0;
        let right = out.get_pixel(6, 3).0;
        assert!(left[3] < 255 && right[3] > 0, "{left:?} {right:?}");
        assert!(left[0] > 0 && right[0] < 255, "{left:?} {right:?}");
        // Far from the edge nothing changes beyond rounding.
        let far = out.get_pixel(0, 0).0;
        assert!(far[0] <= 1 && far[3] >= 254, "{far:?}");
    }

    #[test]
    fn flat_translucent_image_survives_blur() {
        let img = RgbaImage::from_pixel(9, 9, Rgba([40, 80, 120, 60]));
        for p in gaussian_blur(&img, 2.0).pixels() {
            for (got, want) in p.0.iter().zip([40u8, 80, 120, 60]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", p.0);
            }
        }
    }

    #[test]
    fn unsharp_mask_restores_edge_and_keeps_alpha() {
        let img = split_alpha();
        let out = unsharp_mask(&img, 1.5, 1.0, 0.0);
        // White bled into the black side; sharpening pulls it back.
        assert_eq!(out.get_pixel(5, 3).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(6, 3).0, [255, 255, 255, 0]);
        assert!(out.pixels().zip(img.pixels()).all(|(a, b)| a.0[3] == b.0[3]));
    }

    #[test]
    fn unsharp_mask_without_effect_is_identity() {
        let img = split_alpha();
        assert_eq!(unsharp_mask(&img, 1.5, 1.0, 1.0), img);
        assert_eq!(unsharp_mask(&img, 1.5, 0.0, 0.0), img);
    }
}

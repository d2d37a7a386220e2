//! Geometric filters: resize, crop, rotate.
//!
//! Unlike the colour filters these change the image bounds, so they can
//! fail at render time: crop when the rectangle does not fit the image,
//! resize and rotate when the output would exceed [`MAX_OUTPUT_PIXELS`].

use image::Rgba;
use image::imageops::{self, FilterType};
use imageproc::geometric_transformations::{Projection, warp_into};

use crate::types::{Anchor, FilterError, Interpolation, RgbaImage};

/// Largest output, in pixels, a filter may allocate (256 Mpx, 1 GiB
/// of RGBA).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

fn check_output_size(filter: &'static str, width: u32, height: u32) -> Result<(), FilterError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_OUTPUT_PIXELS {
        return Err(FilterError::Render {
            filter,
            reason: format!(
                "output {width}x{height} exceeds the limit of {MAX_OUTPUT_PIXELS} pixels"
            ),
        });
    }
    Ok(())
}

/// Resample to exactly `width` x `height` using Lanczos3.
///
/// # Errors
///
/// Returns [`FilterError::Render`] if the output would exceed
/// [`MAX_OUTPUT_PIXELS`].
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, FilterError> {
    check_output_size("resize", width, height)?;
    Ok(imageops::resize(image, width, height, FilterType::Lanczos3))
}

/// Cut out the rectangle at (`x`, `y`) of size `width` x `height`.
///
/// # Errors
///
/// Returns [`FilterError::Render`] if the rectangle is empty or extends
/// past the image bounds.
pub fn crop(
    image: &RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<RgbaImage, FilterError> {
    if width == 0 || height == 0 {
        return Err(FilterError::Render {
            filter: "crop",
            reason: format!("crop region {width}x{height} is empty"),
        });
    }

    let (img_w, img_h) = image.dimensions();
    let fits_x = x.checked_add(width).is_some_and(|right| right <= img_w);
    let fits_y = y.checked_add(height).is_some_and(|bottom| bottom <= img_h);
    if !(fits_x && fits_y) {
        return Err(FilterError::Render {
            filter: "crop",
            reason: format!(
                "crop region {width}x{height} at ({x}, {y}) exceeds image bounds {img_w}x{img_h}"
            ),
        });
    }

    Ok(imageops::crop_imm(image, x, y, width, height).to_image())
}

/// Cut out a `width` x `height` rectangle placed by `anchor`.
///
/// The requested size is clamped to the image size, so this never
/// fails.
#[must_use = "returns the cropped image"]
pub fn crop_to_size(image: &RgbaImage, width: u32, height: u32, anchor: Anchor) -> RgbaImage {
    let outer = image.dimensions();
    let inner = (width.min(outer.0), height.min(outer.1));
    let (x, y) = anchor.origin(outer, inner);
    imageops::crop_imm(image, x, y, inner.0, inner.1).to_image()
}

/// Rotate counter-clockwise by `angle` degrees.
///
/// The output grows to the bounding box of the rotated image and the
/// uncovered corners are transparent. Exact multiples of 90 degrees
/// are lossless quarter turns and ignore `interpolation`.
///
/// # Errors
///
/// Returns [`FilterError::Render`] if the bounding box would exceed
/// [`MAX_OUTPUT_PIXELS`].
pub fn rotate(
    image: &RgbaImage,
    angle: f32,
    interpolation: Interpolation,
) -> Result<RgbaImage, FilterError> {
    let angle = angle.rem_euclid(360.0);
    #[allow(clippy::float_cmp)]
    match angle {
        a if a == 0.0 => return Ok(image.clone()),
        a if a == 90.0 => return Ok(imageops::rotate270(image)),
        a if a == 180.0 => return Ok(imageops::rotate180(image)),
        a if a == 270.0 => return Ok(imageops::rotate90(image)),
        _ => {}
    }

    let (w, h) = image.dimensions();
    #[allow(clippy::cast_precision_loss)]
    let (wf, hf) = (w as f32, h as f32);
    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let out_w = bounding_extent(wf, hf, cos, sin);
    let out_h = bounding_extent(hf, wf, cos, sin);
    check_output_size("rotate", out_w, out_h)?;

    // Image y points down, so a counter-clockwise turn on screen is a
    // negative angle for the projection.
    #[allow(clippy::cast_precision_loss)]
    let projection = Projection::translate(out_w as f32 / 2.0, out_h as f32 / 2.0)
        * Projection::rotate(-theta)
        * Projection::translate(-wf / 2.0, -hf / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(
        image,
        &projection,
        interpolation.to_imageproc(),
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    Ok(out)
}

/// Half turn.
#[must_use = "returns the rotated image"]
pub fn rotate_180(image: &RgbaImage) -> RgbaImage {
    imageops::rotate180(image)
}

/// Extent of the rotated bounding box along one axis.
///
/// A small tolerance keeps float noise from adding a spurious extra
/// pixel row or column.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bounding_extent(along: f32, across: f32, cos: f32, sin: f32) -> u32 {
    let extent = along.mul_add(cos.abs(), across * sin.abs());
    ((extent - 1e-3).ceil() as u32).max(1)
}

//! Neighbourhood filters: pixelate and the square-window rank filters
//! (mean, median, minimum, maximum).
//!
//! Rank filters use a `(2 * radius + 1)`-sided window. Past the image
//! edges the nearest edge pixel repeats, which for minimum and maximum
//! is the same as clipping the window. A radius larger than the image
//! is treated as the larger image side. When `alpha` is `false` the
//! alpha channel is copied from the source instead of being filtered.
//!
//! Median comes from [`imageproc::filter::median_filter`] and mean from
//! [`imageproc::filter::box_filter`] (truncating, one pass per axis).
//! Minimum and maximum are grayscale erosion and dilation with line
//! masks, one axis at a time, which is exact for a square window.

use std::fmt;

use image::{GrayImage, Luma, Rgba};
use imageproc::filter::{box_filter, median_filter};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

use crate::blur::{merge_channels, split_channels};
use crate::types::RgbaImage;

/// Which statistic a window filter reduces its neighbourhood to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStat {
    Mean,
    Median,
    Minimum,
    Maximum,
}

impl fmt::Display for WindowStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => f.write_str("mean"),
            Self::Median => f.write_str("median"),
            Self::Minimum => f.write_str("minimum"),
            Self::Maximum => f.write_str("maximum"),
        }
    }
}

type Morphology = fn(&GrayImage, &Mask) -> GrayImage;

/// A one-pixel-thick mask of length `2 * radius + 1`.
fn line_mask(radius: u8, horizontal: bool) -> Mask {
    let side = u32::from(radius) * 2 + 1;
    let line = if horizontal {
        GrayImage::from_pixel(side, 1, Luma([u8::MAX]))
    } else {
        GrayImage::from_pixel(1, side, Luma([u8::MAX]))
    };
    let (cx, cy) = if horizontal { (radius, 0) } else { (0, radius) };
    Mask::from_image(&line, cx, cy)
}

/// Erode or dilate with a square of `radius`, split into line passes
/// of at most 255 pixels each side.
fn square_morphology(channel: &GrayImage, radius: u32, op: Morphology) -> GrayImage {
    let mut out = channel.clone();
    let mut remaining = radius;
    while remaining > 0 {
        let step = u8::try_from(remaining).unwrap_or(u8::MAX);
        out = op(&out, &line_mask(step, true));
        out = op(&out, &line_mask(step, false));
        remaining -= u32::from(step);
    }
    out
}

fn per_channel(image: &RgbaImage, f: impl Fn(&GrayImage) -> GrayImage) -> RgbaImage {
    let channels = split_channels(image);
    merge_channels(&channels.each_ref().map(f))
}

/// Replace each pixel by `stat` over its square window.
#[must_use = "returns the filtered image"]
pub fn window_filter(image: &RgbaImage, stat: WindowStat, radius: u32, alpha: bool) -> RgbaImage {
    let (w, h) = image.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return image.clone();
    }
    let radius = radius.min(w.max(h));

    let mut out = match stat {
        WindowStat::Median => median_filter(image, radius, radius),
        WindowStat::Mean => per_channel(image, |c| box_filter(c, radius, radius)),
        WindowStat::Minimum => per_channel(image, |c| square_morphology(c, radius, grayscale_erode)),
        WindowStat::Maximum => {
            per_channel(image, |c| square_morphology(c, radius, grayscale_dilate))
        }
    };

    if !alpha {
        for (pixel, source) in out.pixels_mut().zip(image.pixels()) {
            pixel.0[3] = source.0[3];
        }
    }
    out
}

/// Replace every `size` x `size` block (anchored at the top-left) with
/// its mean colour. Edge blocks are smaller when the image size is not
/// a multiple of `size`.
#[must_use = "returns the pixelated image"]
pub fn pixelate(image: &RgbaImage, size: u32) -> RgbaImage {
    if size <= 1 {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    let mut out = image.clone();
    for by in (0..h).step_by(size as usize) {
        for bx in (0..w).step_by(size as usize) {
            let x1 = bx.saturating_add(size).min(w);
            let y1 = by.saturating_add(size).min(h);

            let mut sums = [0u64; 4];
            for y in by..y1 {
                for x in bx..x1 {
                    for (sum, &v) in sums.iter_mut().zip(image.get_pixel(x, y).0.iter()) {
                        *sum += u64::from(v);
                    }
                }
            }
            let n = u64::from(x1 - bx) * u64::from(y1 - by);
            let avg = Rgba(sums.map(|s| u8::try_from((s + n / 2) / n).unwrap_or(u8::MAX)));

            for y in by..y1 {
                for x in bx..x1 {
                    out.put_pixel(x, y, avg);
                }
            }
        }
    }
    out
}

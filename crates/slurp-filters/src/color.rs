//! Per-pixel colour filters: grayscale, saturation, hue, colorize,
//! sepia and colour balance.
//!
//! All of these leave the alpha channel untouched and work on colour
//! channels normalised to `[0, 1]`. Hue-based filters go through HSL.

use image::Rgba;

use crate::types::RgbaImage;

/// 8-bit luminance using the integer form of the 0.299/0.587/0.114
/// weighting.
///
/// Channels are widened to 16 bits (`c * 257`) before weighting and
/// the result is rounded back to 8 bits, so pure white maps to 255 and
/// pure black to 0 exactly.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let wide = |c: u8| u64::from(c) * 257;
    luminance16(wide(r), wide(g), wide(b))
}

/// [`luminance`] of 16-bit channels (`0..=65535`).
pub(crate) fn luminance16(r: u64, g: u64, b: u64) -> u8 {
    let y = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24;
    // y <= 255 since the weights sum to 2^16.
    u8::try_from(y).unwrap_or(u8::MAX)
}

pub(crate) fn to_unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn from_unit(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Apply `f` to the normalised RGB channels of every pixel, keeping alpha.
pub(crate) fn map_rgb(image: &RgbaImage, f: impl Fn([f32; 3]) -> [f32; 3]) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let [r, g, b] = f([to_unit(r), to_unit(g), to_unit(b)]);
        *pixel = Rgba([from_unit(r), from_unit(g), from_unit(b), a]);
    }
    out
}

/// Convert normalised RGB to HSL. Hue is in `[0, 1)`.
pub(crate) fn rgb_to_hsl([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;
    if delta <= f32::EPSILON {
        return [0.0, 0.0, l];
    }

    let s = if l < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    #[allow(clippy::float_cmp)]
    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    [h / 6.0, s, l]
}

/// Convert HSL (hue in `[0, 1)`) back to normalised RGB.
pub(crate) fn hsl_to_rgb([h, s, l]: [f32; 3]) -> [f32; 3] {
    if s <= f32::EPSILON {
        return [l, l, l];
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        s.mul_add(-l, l + s)
    };
    let p = 2.0f32.mul_add(l, -q);

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            ((q - p) * 6.0).mul_add(t, p)
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p)
        } else {
            p
        }
    };

    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

/// Replace colour with luminance; alpha is kept.
#[must_use = "returns the grayscale image"]
pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let y = luminance(r, g, b);
        *pixel = Rgba([y, y, y, a]);
    }
    out
}

/// Scale HSL saturation by `1 + percentage / 100`.
#[must_use = "returns the adjusted image"]
pub fn saturation(image: &RgbaImage, percentage: f32) -> RgbaImage {
    let factor = 1.0 + percentage / 100.0;
    map_rgb(image, |rgb| {
        let [h, s, l] = rgb_to_hsl(rgb);
        hsl_to_rgb([h, (s * factor).clamp(0.0, 1.0), l])
    })
}

/// Rotate the hue by `angle` degrees.
#[must_use = "returns the adjusted image"]
pub fn hue(image: &RgbaImage, angle: f32) -> RgbaImage {
    let shift = angle / 360.0;
    map_rgb(image, |rgb| {
        let [h, s, l] = rgb_to_hsl(rgb);
        hsl_to_rgb([(h + shift).rem_euclid(1.0), s, l])
    })
}

/// Tint the image: every pixel keeps its lightness and takes `hue`
/// (degrees) and `saturation` (`[0, 1]`); the tinted result is blended
/// with the original by `amount` (`[0, 1]`).
#[must_use = "returns the colorized image"]
pub fn colorize(image: &RgbaImage, hue: f32, saturation: f32, amount: f32) -> RgbaImage {
    let h = (hue / 360.0).rem_euclid(1.0);
    map_rgb(image, |rgb| {
        let [_, _, l] = rgb_to_hsl(rgb);
        let tinted = hsl_to_rgb([h, saturation, l]);
        blend(rgb, tinted, amount)
    })
}

/// Classic sepia matrix, blended with the original by `percentage / 100`.
#[must_use = "returns the sepia-toned image"]
pub fn sepia(image: &RgbaImage, percentage: f32) -> RgbaImage {
    let amount = percentage / 100.0;
    map_rgb(image, |[r, g, b]| {
        let toned = [
            0.189f32.mul_add(b, 0.393f32.mul_add(r, 0.769 * g)),
            0.168f32.mul_add(b, 0.349f32.mul_add(r, 0.686 * g)),
            0.131f32.mul_add(b, 0.272f32.mul_add(r, 0.534 * g)),
        ];
        blend([r, g, b], toned, amount)
    })
}

/// Multiply each colour channel by `1 + value` for that channel.
#[must_use = "returns the rebalanced image"]
pub fn color_balance(image: &RgbaImage, red: f32, green: f32, blue: f32) -> RgbaImage {
    map_rgb(image, |[r, g, b]| {
        [r * (1.0 + red), g * (1.0 + green), b * (1.0 + blue)]
    })
}

fn blend(from: [f32; 3], to: [f32; 3], amount: f32) -> [f32; 3] {
    std::array::from_fn(|c| (to[c] - from[c]).mul_add(amount, from[c]))
}

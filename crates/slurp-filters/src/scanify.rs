//! Document "scan" look: push near-white to white and near-black to
//! black, keep the mid-tones as gray.

use image::Rgba;

use crate::color::luminance16;
use crate::types::RgbaImage;

/// Luminance strictly above this becomes pure white.
pub const WHITE_ABOVE: u8 = 200;

/// Luminance strictly below this becomes pure black.
pub const BLACK_BELOW: u8 = 80;

/// Map one luminance value through the scanify threshold.
#[must_use]
pub const fn threshold(gray: u8) -> u8 {
    if gray > WHITE_ABOVE {
        255
    } else if gray < BLACK_BELOW {
        0
    } else {
        gray
    }
}

/// Luminance of a pixel after premultiplying its colour by alpha, so a
/// fully transparent pixel reads as black.
#[must_use]
pub fn premultiplied_luminance(Rgba([r, g, b, a]): Rgba<u8>) -> u8 {
    let alpha = u64::from(a) * 257;
    let channel = |c: u8| u64::from(c) * 257 * alpha / 0xFFFF;
    luminance16(channel(r), channel(g), channel(b))
}

/// Convert every pixel to premultiplied luminance and apply
/// [`threshold`].
///
/// The output is opaque gray with the same bounds as the input.
#[must_use = "returns the scanified image"]
pub fn scanify(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let v = threshold(premultiplied_luminance(*pixel));
        *pixel = Rgba([v, v, v, 255]);
    }
    out
}

//! Image decoding, encoding and upload-extension checks.
//!
//! Everything here works on in-memory byte slices. Where the bytes come
//! from (multipart upload, filesystem, object store) is the caller's
//! concern.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::buffer::ConvertBuffer;
use serde::{Deserialize, Serialize};

use crate::types::RgbaImage;

/// Encoding used for persisted versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless; keeps alpha. Re-encoding is byte-stable.
    #[default]
    Png,
    /// Lossy; alpha is dropped on encode.
    Jpeg,
}

impl ImageFormat {
    /// File extension (without the dot) used in storage keys.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type for HTTP responses.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Map a file extension (without the dot) to a format, ignoring ASCII case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// Errors from decoding, encoding or extension checks.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Failed to encode an image.
    #[error("failed to encode image as {format}: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    /// The uploaded file name does not carry an accepted image extension.
    #[error("the image is not of a valid type: {0:?}")]
    UnsupportedExtension(String),
}

/// Decode raw image bytes into an RGBA image.
///
/// Supports PNG, JPEG, BMP and WebP (whatever the `image` crate was
/// built with).
///
/// # Errors
///
/// Returns [`CodecError::EmptyInput`] if `bytes` is empty.
/// Returns [`CodecError::Decode`] if the format is unrecognized or the
/// data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA image.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the encoder rejects the image
/// (for example, zero dimensions).
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    let result = match format {
        ImageFormat::Png => image.write_to(&mut buf, image::ImageFormat::Png),
        ImageFormat::Jpeg => {
            let rgb: image::RgbImage = image.convert();
            rgb.write_to(&mut buf, image::ImageFormat::Jpeg)
        }
    };
    result.map_err(|source| CodecError::Encode { format, source })?;
    Ok(buf.into_inner())
}

/// Check an uploaded file name against the accepted extensions
/// (`.png`, `.jpg`, `.jpeg`) and return the matching format.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedExtension`] for any other or
/// missing extension.
pub fn format_from_filename(filename: &str) -> Result<ImageFormat, CodecError> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| CodecError::UnsupportedExtension(filename.to_string()))
}

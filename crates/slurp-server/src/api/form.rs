//! Multipart form reading shared by the upload and scan routes.

use axum::body::Bytes;
use axum::extract::Multipart;
use slurp_filters::{RgbaImage, codec};

use crate::error::ApiError;

/// The `image` file field of an upload.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Check the extension, then decode.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an unsupported extension or
    /// bytes that are not a readable image.
    pub fn decode(&self) -> Result<RgbaImage, ApiError> {
        codec::format_from_filename(&self.filename)
            .map_err(|e| ApiError::validation(e.to_string()))?;
        codec::decode(&self.bytes).map_err(|e| ApiError::validation(e.to_string()))
    }
}

/// Fields the image routes understand. Other fields are ignored.
#[derive(Default)]
pub struct ImageForm {
    pub image: Option<UploadedFile>,
    pub points: Option<String>,
}

impl ImageForm {
    /// Drain `multipart`, keeping the `image` and `points` fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the body is not valid
    /// multipart or exceeds the body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("image") => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await.map_err(invalid)?;
                    form.image = Some(UploadedFile { filename, bytes });
                }
                Some("points") => form.points = Some(field.text().await.map_err(invalid)?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the `image` field is
    /// missing.
    pub fn require_image(&mut self) -> Result<UploadedFile, ApiError> {
        self.image
            .take()
            .ok_or_else(|| ApiError::validation("missing file field `image`"))
    }
}

fn invalid(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::validation(format!("invalid multipart body: {}", e.body_text()))
}

//! Client for the external perspective-correction ("scanner") service.
//!
//! The service receives a JPEG plus the four document corners and
//! answers with the rectified image. It is reached over the network, so
//! every request carries a timeout and is made without any store lock
//! held.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

/// Four `[x, y]` corner points of the document in the uploaded image.
pub type Corners = [[i64; 2]; 4];

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scanner request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("scanner answered {0}")]
    Status(StatusCode),

    #[error("could not encode corner points: {0}")]
    Points(#[from] serde_json::Error),
}

#[async_trait]
pub trait Scanner: Send + Sync {
    /// Send `jpeg` and its corners; return the rectified image bytes.
    async fn scan(&self, jpeg: Vec<u8>, corners: &Corners) -> Result<Vec<u8>, ScanError>;
}

/// Multipart POST to a fixed URL: `file` holds the JPEG, `points` the
/// corners as a JSON array.
#[derive(Clone)]
pub struct HttpScanner {
    client: Client,
    url: String,
}

impl HttpScanner {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScanError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Scanner for HttpScanner {
    async fn scan(&self, jpeg: Vec<u8>, corners: &Corners) -> Result<Vec<u8>, ScanError> {
        let points = serde_json::to_string(corners)?;
        let file = Part::bytes(jpeg)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", file).text("points", points);

        tracing::debug!(url = %self.url, "sending image to scanner");
        let resp = self.client.post(&self.url).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(ScanError::Status(resp.status()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

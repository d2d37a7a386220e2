//! One error type for every handler, mapped onto HTTP statuses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use slurp_filters::{CodecError, FilterError};
use slurp_store::StoreError;

use crate::scanner::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing request data.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Nothing to undo or redo.
    #[error("{0}")]
    State(String),

    /// A collaborator failed. Only `message` reaches the client.
    #[error("{message}: {cause}")]
    Upstream {
        message: &'static str,
        cause: String,
    },

    /// Anything unexpected. The cause is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// A scan stored version 0 under `uuid` and then failed. The client
    /// gets the uuid alongside the inner error.
    #[error("scan of image {uuid} did not finish: {source}")]
    ScanIncomplete {
        uuid: String,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(message: &'static str, cause: impl ToString) -> Self {
        Self::Upstream {
            message,
            cause: cause.to_string(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::State(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ScanIncomplete { source, .. } => source.status(),
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::State(m) => m.clone(),
            Self::Upstream { message, .. } => (*message).to_owned(),
            Self::Internal(_) => "internal server error".to_owned(),
            Self::ScanIncomplete { source, .. } => source.public_message(),
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::ScanIncomplete { uuid, .. } => {
                json!({ "error": self.public_message(), "uuid": uuid })
            }
            _ => json!({ "error": self.public_message() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) | StoreError::VersionNotFound { .. } => {
                Self::NotFound(e.to_string())
            }
            StoreError::NothingToUndo(_) | StoreError::NothingToRedo(_) => {
                Self::State(e.to_string())
            }
            StoreError::Blob(_) => Self::upstream("image storage failed", e),
            StoreError::Codec(_) => Self::upstream("image encoding failed", e),
            StoreError::AlreadyExists(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(e: CodecError) -> Self {
        Self::upstream("image encoding failed", e)
    }
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        Self::upstream("scanner request failed", e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::from(StoreError::NotFound("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::NothingToUndo("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FilterError::UnknownFilter("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CodecError::EmptyInput).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_cause() {
        let err = ApiError::upstream("scanner request failed", "connection refused to 10.0.0.1");
        assert_eq!(err.public_message(), "scanner request failed");
        assert_eq!(
            ApiError::Internal("secret path".into()).public_message(),
            "internal server error"
        );
    }

    #[test]
    fn incomplete_scan_keeps_inner_status_and_reports_uuid() {
        let err = ApiError::ScanIncomplete {
            uuid: "abc".into(),
            source: Box::new(ApiError::upstream("scanner request failed", "timeout")),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.body(),
            json!({"error": "scanner request failed", "uuid": "abc"})
        );
    }

    #[test]
    fn client_errors_show_message() {
        let err = ApiError::from(StoreError::NothingToRedo("abc".into()));
        assert_eq!(err.public_message(), "nothing to redo for image abc");
    }
}

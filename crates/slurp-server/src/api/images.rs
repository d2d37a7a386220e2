//! Upload, filter, undo/redo, download and history routes.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use slurp_filters::{FilterSpec, ImageFormat, Pipeline, codec};
use slurp_store::{HistorySnapshot, ImageVersion};
use uuid::Uuid;

use super::blocking;
use super::form::ImageForm;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /image/upload`: store the `image` field as version 0 of a new
/// entity.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImageVersion>), ApiError> {
    let file = ImageForm::read(multipart).await?.require_image()?;
    let version = blocking(move || {
        let image = file.decode()?;
        let entity_id = Uuid::new_v4().to_string();
        Ok(state.store.create_initial(&entity_id, &image)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `POST /image/filter/{image_id}`: render the filter list over the
/// current version and commit the result.
pub async fn apply_filters(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImageVersion>), ApiError> {
    let specs: Vec<FilterSpec> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::validation(format!("invalid filter list: {e}")))?;
    let pipeline = Pipeline::from_specs(&specs)?;
    tracing::debug!(image_id = %image_id, filters = pipeline.len(), "applying filters");

    let version = blocking(move || {
        let source = state.store.load_current(&image_id)?;
        let rendered = pipeline.apply(&source)?;
        Ok(state.store.commit(&image_id, &rendered)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `POST /image/{image_id}/undo`
pub async fn undo(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<ImageVersion>, ApiError> {
    let version = blocking(move || Ok(state.store.undo(&image_id)?)).await?;
    Ok(Json(version))
}

/// `POST /image/{image_id}/redo`
pub async fn redo(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<ImageVersion>, ApiError> {
    let version = blocking(move || Ok(state.store.redo(&image_id)?)).await?;
    Ok(Json(version))
}

/// `GET /image/{image_id}/download`: the current version as PNG.
pub async fn download(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let png = blocking(move || {
        let bytes = state.store.load_current_bytes(&image_id)?;
        if state.store.format() == ImageFormat::Png {
            return Ok(bytes);
        }
        let image = codec::decode(&bytes)?;
        Ok(codec::encode(&image, ImageFormat::Png)?)
    })
    .await?;
    Ok((
        [(header::CONTENT_TYPE, ImageFormat::Png.mime_type())],
        png,
    ))
}

/// `GET /image/{image_id}/history`
pub async fn history(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<HistorySnapshot>, ApiError> {
    let snapshot = blocking(move || Ok(state.store.versions(&image_id)?)).await?;
    Ok(Json(snapshot))
}

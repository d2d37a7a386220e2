//! `POST /image/scan`: upload a document photo, rectify it through the
//! external scanner, and clean it up with the document preset.
//!
//! The upload becomes version 0 and the cleaned scan version 1. The
//! scanner call happens between the two store operations with no lock
//! held. If anything fails after version 0 is stored, the error body
//! carries its uuid so the upload stays reachable.

use axum::Json;
use axum::extract::{Multipart, State};
use slurp_filters::{ImageFormat, Pipeline, codec, presets};
use slurp_store::ImageVersion;
use uuid::Uuid;

use super::blocking;
use super::form::ImageForm;
use crate::error::ApiError;
use crate::scanner::Corners;
use crate::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImageVersion>, ApiError> {
    let mut form = ImageForm::read(multipart).await?;
    let file = form.require_image()?;
    let corners = parse_corners(form.points.as_deref())?;
    let scanner = state
        .scanner
        .clone()
        .ok_or_else(|| ApiError::upstream("scanner is not configured", "no scanner url"))?;

    let store = state.store.clone();
    let (entity_id, jpeg) = blocking(move || {
        let image = file.decode()?;
        let entity_id = Uuid::new_v4().to_string();
        store.create_initial(&entity_id, &image)?;
        let jpeg = codec::encode(&image, ImageFormat::Jpeg)?;
        Ok((entity_id, jpeg))
    })
    .await?;

    let finish = async {
        let scanned = scanner.scan(jpeg, &corners).await?;
        tracing::info!(entity_id = %entity_id, bytes = scanned.len(), "scanner returned image");

        let id = entity_id.clone();
        blocking(move || {
            let image = codec::decode(&scanned)
                .map_err(|e| ApiError::upstream("scanner returned an unreadable image", e))?;
            let cleaned = Pipeline::from_specs(&presets::document_scan())?.apply(&image)?;
            Ok(state.store.commit(&id, &cleaned)?)
        })
        .await
    };

    let outcome = finish.await;
    match outcome {
        Ok(version) => Ok(Json(version)),
        Err(e) => {
            tracing::warn!(entity_id = %entity_id, error = %e, "scan failed after storing version 0");
            Err(ApiError::ScanIncomplete {
                uuid: entity_id,
                source: Box::new(e),
            })
        }
    }
}

fn parse_corners(points: Option<&str>) -> Result<Corners, ApiError> {
    let raw = points
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::validation("points are required"))?;
    serde_json::from_str(raw).map_err(|e| {
        ApiError::validation(format!("points must be four [x, y] pairs: {e}"))
    })
}

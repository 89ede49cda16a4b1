use axum::{Extension, Json, extract::Path, http::HeaderMap, response::IntoResponse};
use mongodb::bson::Document;
use serde_json::json;
use tracing::info;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::model::sanitize_update;
use crate::policy::load_for_mutation;
use crate::routes::artifacts::parse_artifact_id;
use crate::state::AppState;

pub async fn update_artifact(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Document>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_artifact_id(&id)?;

    load_for_mutation(state.store.as_ref(), id, &principal).await?;

    let update = sanitize_update(payload);
    if update.is_empty() {
        // Nothing left after stripping protected fields.
        return Ok(Json(json!({
            "success": true,
            "message": "Artifact updated successfully",
        })));
    }

    if !state.store.apply_update(id, update).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Artifact updated successfully",
    })))
}

pub async fn delete_artifact(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_artifact_id(&id)?;

    load_for_mutation(state.store.as_ref(), id, &principal).await?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    info!("Artifact {} deleted by {}", id.to_hex(), principal.email);

    Ok(Json(json!({
        "success": true,
        "message": "Artifact deleted successfully",
    })))
}

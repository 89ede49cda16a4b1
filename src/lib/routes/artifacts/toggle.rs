use axum::{Extension, Json, extract::Path, http::HeaderMap, response::IntoResponse};
use serde_json::json;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::likes;
use crate::routes::artifacts::parse_artifact_id;
use crate::state::AppState;

/// Any authenticated principal may toggle, including the owner.
pub async fn like_artifact(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_artifact_id(&id)?;

    likes::like(state.store.as_ref(), id, &principal.email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Like count updated successfully",
    })))
}

pub async fn dislike_artifact(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let id = parse_artifact_id(&id)?;

    likes::dislike(state.store.as_ref(), id, &principal.email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Like count updated successfully",
    })))
}

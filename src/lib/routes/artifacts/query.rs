use axum::{
    Extension, Json,
    extract::Path,
    http::HeaderMap,
    response::IntoResponse,
};
use tracing::debug;

use crate::auth::authenticate;
use crate::constants::TOP_LIKED_LIMIT;
use crate::error::ApiError;
use crate::routes::artifacts::parse_artifact_id;
use crate::state::AppState;

pub async fn list_artifacts(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let artifacts = state.store.find_all().await?;
    Ok(Json(artifacts))
}

pub async fn get_artifact(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_artifact_id(&id)?;
    let artifact = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(artifact))
}

pub async fn top_liked(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let artifacts = state.store.top_liked(TOP_LIKED_LIMIT).await?;
    Ok(Json(artifacts))
}

/// The path email is informational only; the verified principal's own email
/// drives the query.
pub async fn user_artifacts(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    if email != principal.email {
        debug!(
            "Path email {} ignored in favor of principal {}",
            email, principal.email
        );
    }

    let artifacts = state.store.find_by_owner(&principal.email).await?;
    Ok(Json(artifacts))
}

pub async fn liked_artifacts(
    Extension(state): Extension<AppState>,
    Path(_email): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;
    let artifacts = state.store.find_liked_by(&principal.email).await?;
    Ok(Json(artifacts))
}

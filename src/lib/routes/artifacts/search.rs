use axum::{Extension, Json, extract::Query, response::IntoResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::Artifact;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

/// Empty or missing query returns an empty list, not the whole collection.
pub async fn search_artifacts(
    Extension(state): Extension<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Ok(Json(Vec::<Artifact>::new()));
    }

    let artifacts = state.store.search(query.trim()).await?;
    Ok(Json(artifacts))
}

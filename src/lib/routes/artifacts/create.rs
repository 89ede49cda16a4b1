use axum::{
    Extension, Json,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use mongodb::bson::Document;
use serde_json::json;
use tracing::info;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::model::Artifact;
use crate::state::AppState;

pub async fn create_artifact(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Document>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state, &headers).await?;

    let artifact = Artifact::new(&principal, payload);
    let inserted_id = state.store.insert(artifact).await?;

    info!("Artifact {} added by {}", inserted_id, principal.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Artifact added successfully",
            "insertedId": inserted_id,
        })),
    ))
}

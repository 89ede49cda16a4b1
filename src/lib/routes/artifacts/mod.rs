use axum::{
    Router,
    routing::{get, patch},
};

pub mod create;
pub mod mutate;
pub mod query;
pub mod search;
pub mod toggle;

use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;

pub fn register() -> Router {
    Router::new()
        .route(
            "/api/artifacts",
            get(query::list_artifacts).post(create::create_artifact),
        )
        .route("/api/artifacts/top-liked", get(query::top_liked))
        .route("/api/artifacts/search", get(search::search_artifacts))
        .route("/api/artifacts/user/{email}", get(query::user_artifacts))
        .route("/api/artifacts/liked/{email}", get(query::liked_artifacts))
        .route(
            "/api/artifacts/{id}",
            get(query::get_artifact)
                .patch(mutate::update_artifact)
                .delete(mutate::delete_artifact),
        )
        .route("/api/artifacts/{id}/like", patch(toggle::like_artifact))
        .route(
            "/api/artifacts/{id}/dislike",
            patch(toggle::dislike_artifact),
        )
}

/// Parses a path id, rejecting malformed ids before any store lookup.
pub(crate) fn parse_artifact_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::InvalidId)
}

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};

pub fn register() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root_info))
}

async fn health_check() -> &'static str {
    r#"{"status":"ok"}"#
}

async fn root_info() -> Json<Value> {
    Json(json!({
        "message": "Artifacts Server is running!",
        "endpoints": [
            "/health",
            "/api/artifacts",
            "/api/artifacts/top-liked",
            "/api/artifacts/search",
            "/api/artifacts/{id}",
            "/api/artifacts/{id}/like",
            "/api/artifacts/{id}/dislike",
            "/api/artifacts/user/{email}",
            "/api/artifacts/liked/{email}"
        ]
    }))
}

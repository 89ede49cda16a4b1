use anyhow::Result;
use mongodb::Client;
use mongodb::bson::doc;

pub mod auth;
pub mod constants;
pub mod database;
pub mod error;
pub mod likes;
pub mod memory;
pub mod model;
pub mod policy;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use auth::{IssuerClient, Principal, TokenVerifier};
pub use database::MongoArtifactStore;
pub use error::ApiError;
pub use memory::MemoryArtifactStore;
pub use model::Artifact;
pub use state::AppState;
pub use store::{ArtifactStore, ToggleOutcome};

pub async fn create_database_connection() -> Result<Client> {
    let client = Client::with_uri_str(&utils::CONFIG.mongo_uri).await?;

    // Fail fast on an unreachable deployment instead of at the first request.
    client
        .database(&utils::CONFIG.mongo_db)
        .run_command(doc! { "ping": 1 }, None)
        .await?;

    Ok(client)
}

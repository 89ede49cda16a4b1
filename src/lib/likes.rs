use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::store::{ArtifactStore, ToggleOutcome};

/// Toggles `email` into the artifact's liked-by set. Idempotent: liking an
/// already-liked artifact succeeds without touching the counter. Returns
/// whether membership actually changed.
pub async fn like(store: &dyn ArtifactStore, id: ObjectId, email: &str) -> Result<bool, ApiError> {
    match store.add_like(id, email).await? {
        ToggleOutcome::Applied => Ok(true),
        ToggleOutcome::Unchanged => Ok(false),
        ToggleOutcome::Missing => Err(ApiError::NotFound),
    }
}

/// Removes `email` from the liked-by set. Disliking an artifact the
/// principal never liked is a successful no-op.
pub async fn dislike(
    store: &dyn ArtifactStore,
    id: ObjectId,
    email: &str,
) -> Result<bool, ApiError> {
    match store.remove_like(id, email).await? {
        ToggleOutcome::Applied => Ok(true),
        ToggleOutcome::Unchanged => Ok(false),
        ToggleOutcome::Missing => Err(ApiError::NotFound),
    }
}

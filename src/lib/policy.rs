use mongodb::bson::oid::ObjectId;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::model::Artifact;
use crate::store::ArtifactStore;

/// Only the creator may mutate an artifact. Like/dislike toggles are not
/// routed through this check.
pub fn authorize_mutation(principal: &Principal, artifact: &Artifact) -> Result<(), ApiError> {
    if artifact.adder_email == principal.email {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Loads an artifact for an owner-only mutation. Existence is checked before
/// ownership: a missing id is `NotFound` for every caller, never `Forbidden`.
pub async fn load_for_mutation(
    store: &dyn ArtifactStore,
    id: ObjectId,
    principal: &Principal,
) -> Result<Artifact, ApiError> {
    let artifact = store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    authorize_mutation(principal, &artifact)?;
    Ok(artifact)
}

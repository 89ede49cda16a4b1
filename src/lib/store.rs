use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};

use crate::model::Artifact;

/// Result of an atomic like/dislike toggle at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Membership and counter both changed, committed together.
    Applied,
    /// The artifact exists but the toggle was already in the requested state.
    Unchanged,
    /// No artifact with that id.
    Missing,
}

/// Storage adapter for the artifacts collection. Implementations must make
/// `add_like` / `remove_like` atomic per document: membership and counter
/// move together or not at all, even under concurrent callers.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Inserts a new artifact and returns its assigned id as a hex string.
    async fn insert(&self, artifact: Artifact) -> Result<String>;

    async fn find_all(&self) -> Result<Vec<Artifact>>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Artifact>>;

    async fn find_by_owner(&self, email: &str) -> Result<Vec<Artifact>>;

    async fn find_liked_by(&self, email: &str) -> Result<Vec<Artifact>>;

    /// Top `limit` artifacts by like count, descending. Ties keep the
    /// store's natural order.
    async fn top_liked(&self, limit: i64) -> Result<Vec<Artifact>>;

    /// Case-insensitive substring match over the descriptive search fields.
    async fn search(&self, query: &str) -> Result<Vec<Artifact>>;

    /// Applies a sanitized partial update. Returns false when no artifact
    /// matched the id.
    async fn apply_update(&self, id: ObjectId, update: Document) -> Result<bool>;

    /// Returns false when no artifact matched the id.
    async fn delete(&self, id: ObjectId) -> Result<bool>;

    /// Adds `email` to the artifact's liked-by set and increments the
    /// counter, only if not already a member.
    async fn add_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome>;

    /// Removes `email` from the liked-by set and decrements the counter,
    /// only if currently a member and the counter is positive.
    async fn remove_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome>;

    async fn health_check(&self) -> Result<()>;
}

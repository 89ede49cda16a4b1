use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};
use std::sync::RwLock;

use crate::constants::SEARCH_FIELDS;
use crate::model::Artifact;
use crate::store::{ArtifactStore, ToggleOutcome};

/// In-process `ArtifactStore` used by tests and local development. Every
/// operation runs under one write lock, which gives the same per-document
/// atomicity the Mongo implementation gets from conditional updates.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<Vec<Artifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_query(artifact: &Artifact, needle: &str) -> bool {
    SEARCH_FIELDS.iter().any(|field| {
        artifact
            .fields
            .get_str(field)
            .is_ok_and(|value| value.to_lowercase().contains(needle))
    })
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn insert(&self, mut artifact: Artifact) -> Result<String> {
        let id = ObjectId::new();
        artifact.id = Some(id);
        self.artifacts
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?
            .push(artifact);
        Ok(id.to_hex())
    }

    async fn find_all(&self) -> Result<Vec<Artifact>> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(artifacts.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Artifact>> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(artifacts.iter().find(|a| a.id == Some(id)).cloned())
    }

    async fn find_by_owner(&self, email: &str) -> Result<Vec<Artifact>> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(artifacts
            .iter()
            .filter(|a| a.adder_email == email)
            .cloned()
            .collect())
    }

    async fn find_liked_by(&self, email: &str) -> Result<Vec<Artifact>> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(artifacts
            .iter()
            .filter(|a| a.liked_by.iter().any(|e| e == email))
            .cloned()
            .collect())
    }

    async fn top_liked(&self, limit: i64) -> Result<Vec<Artifact>> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let mut sorted: Vec<Artifact> = artifacts.clone();
        // Stable sort keeps insertion order for tied counts.
        sorted.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        sorted.truncate(limit.max(0) as usize);
        Ok(sorted)
    }

    async fn search(&self, query: &str) -> Result<Vec<Artifact>> {
        let needle = query.to_lowercase();
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(artifacts
            .iter()
            .filter(|a| matches_query(a, &needle))
            .cloned()
            .collect())
    }

    async fn apply_update(&self, id: ObjectId, update: Document) -> Result<bool> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let Some(artifact) = artifacts.iter_mut().find(|a| a.id == Some(id)) else {
            return Ok(false);
        };

        for (key, value) in update {
            artifact.fields.insert(key, value);
        }
        Ok(true)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let before = artifacts.len();
        artifacts.retain(|a| a.id != Some(id));
        Ok(artifacts.len() < before)
    }

    async fn add_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let Some(artifact) = artifacts.iter_mut().find(|a| a.id == Some(id)) else {
            return Ok(ToggleOutcome::Missing);
        };

        if artifact.liked_by.iter().any(|e| e == email) {
            return Ok(ToggleOutcome::Unchanged);
        }
        artifact.liked_by.push(email.to_string());
        artifact.like_count += 1;
        Ok(ToggleOutcome::Applied)
    }

    async fn remove_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let Some(artifact) = artifacts.iter_mut().find(|a| a.id == Some(id)) else {
            return Ok(ToggleOutcome::Missing);
        };

        if artifact.like_count <= 0 || !artifact.liked_by.iter().any(|e| e == email) {
            return Ok(ToggleOutcome::Unchanged);
        }
        artifact.liked_by.retain(|e| e != email);
        artifact.like_count -= 1;
        Ok(ToggleOutcome::Applied)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use mongodb::bson::doc;

    fn curator() -> Principal {
        Principal {
            email: "cur@museum.org".to_string(),
            uid: "uid-1".to_string(),
            email_verified: true,
        }
    }

    async fn seed(store: &MemoryArtifactStore, name: &str, like_count: i64) -> ObjectId {
        let mut artifact = Artifact::new(&curator(), doc! { "name": name });
        artifact.like_count = like_count;
        artifact.liked_by = (0..like_count).map(|i| format!("fan{i}@x.com")).collect();
        let id = store.insert(artifact).await.unwrap();
        ObjectId::parse_str(&id).unwrap()
    }

    #[tokio::test]
    async fn top_liked_returns_six_in_descending_order() {
        let store = MemoryArtifactStore::new();
        for (i, count) in [5i64, 3, 8, 1, 9, 2, 7].into_iter().enumerate() {
            seed(&store, &format!("artifact-{i}"), count).await;
        }

        let top = store.top_liked(6).await.unwrap();
        let counts: Vec<i64> = top.iter().map(|a| a.like_count).collect();
        assert_eq!(counts, vec![9, 8, 7, 5, 3, 2]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let store = MemoryArtifactStore::new();
        store
            .insert(Artifact::new(
                &curator(),
                doc! { "name": "Rosetta Stone", "description": "Granodiorite stele" },
            ))
            .await
            .unwrap();
        store
            .insert(Artifact::new(
                &curator(),
                doc! { "name": "Astrolabe", "presentLocation": "Cairo Museum" },
            ))
            .await
            .unwrap();

        let by_name = store.search("rosetta").await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_location = store.search("CAIRO").await.unwrap();
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].fields.get_str("name").unwrap(), "Astrolabe");

        let none = store.search("sarcophagus").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn owner_and_liked_by_queries_filter_correctly() {
        let store = MemoryArtifactStore::new();
        let id = seed(&store, "Sundial", 0).await;
        store.add_like(id, "a@x.com").await.unwrap();

        let owned = store.find_by_owner("cur@museum.org").await.unwrap();
        assert_eq!(owned.len(), 1);
        assert!(store.find_by_owner("other@x.com").await.unwrap().is_empty());

        let liked = store.find_liked_by("a@x.com").await.unwrap();
        assert_eq!(liked.len(), 1);
        assert!(store.find_liked_by("b@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = MemoryArtifactStore::new();
        let id = seed(&store, "Amphora", 0).await;

        assert!(store.delete(id).await.unwrap());
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};

use crate::constants::{ARTIFACTS_COLLECTION, SEARCH_FIELDS};
use crate::model::Artifact;
use crate::store::{ArtifactStore, ToggleOutcome};
use crate::utils::CONFIG;

#[derive(Clone)]
pub struct MongoArtifactStore {
    database: Database,
    collection: Collection<Artifact>,
}

impl MongoArtifactStore {
    pub fn new(client: &Client) -> Self {
        let database = client.database(&CONFIG.mongo_db);
        let collection = database.collection(ARTIFACTS_COLLECTION);
        Self {
            database,
            collection,
        }
    }
}

/// Escapes a user-supplied search string for use inside a `$regex`, so the
/// match is a literal substring match.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ArtifactStore for MongoArtifactStore {
    async fn insert(&self, artifact: Artifact) -> Result<String> {
        let result = self.collection.insert_one(artifact, None).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .context("store did not return an ObjectId for the inserted artifact")?;
        Ok(id.to_hex())
    }

    async fn find_all(&self) -> Result<Vec<Artifact>> {
        let cursor = self.collection.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Artifact>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_owner(&self, email: &str) -> Result<Vec<Artifact>> {
        let cursor = self
            .collection
            .find(doc! { "adderEmail": email }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_liked_by(&self, email: &str) -> Result<Vec<Artifact>> {
        let cursor = self
            .collection
            .find(doc! { "likedBy": email }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn top_liked(&self, limit: i64) -> Result<Vec<Artifact>> {
        let pipeline = [
            doc! { "$sort": { "likeCount": -1 } },
            doc! { "$limit": limit },
        ];

        let mut cursor = self.collection.aggregate(pipeline, None).await?;

        let mut artifacts = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            artifacts.push(mongodb::bson::from_document(document)?);
        }
        Ok(artifacts)
    }

    async fn search(&self, query: &str) -> Result<Vec<Artifact>> {
        let pattern = escape_regex(query);
        let clauses: Vec<Document> = SEARCH_FIELDS
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
                clause
            })
            .collect();

        let cursor = self.collection.find(doc! { "$or": clauses }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn apply_update(&self, id: ObjectId, update: Document) -> Result<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": update }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn add_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome> {
        // Membership check, set insert, and counter increment are one
        // conditional update, so the counter moves iff membership changed.
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "likedBy": { "$ne": email } },
                doc! {
                    "$addToSet": { "likedBy": email },
                    "$inc": { "likeCount": 1i64 },
                },
                None,
            )
            .await?;

        if result.modified_count > 0 {
            return Ok(ToggleOutcome::Applied);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(ToggleOutcome::Unchanged),
            None => Ok(ToggleOutcome::Missing),
        }
    }

    async fn remove_like(&self, id: ObjectId, email: &str) -> Result<ToggleOutcome> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "likedBy": email, "likeCount": { "$gt": 0i64 } },
                doc! {
                    "$pull": { "likedBy": email },
                    "$inc": { "likeCount": -1i64 },
                },
                None,
            )
            .await?;

        if result.modified_count > 0 {
            return Ok(ToggleOutcome::Applied);
        }
        match self.find_by_id(id).await? {
            Some(_) => Ok(ToggleOutcome::Unchanged),
            None => Ok(ToggleOutcome::Missing),
        }
    }

    async fn health_check(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::auth::Principal;

/// Fields the server owns. Update payloads containing any of these have them
/// silently stripped before persistence; create payloads cannot override them.
pub const PROTECTED_FIELDS: [&str; 6] = [
    "_id",
    "adderEmail",
    "adderName",
    "likeCount",
    "likedBy",
    "addedDate",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub adder_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adder_name: Option<String>,
    pub like_count: i64,
    #[serde(default)]
    pub liked_by: Vec<String>,
    pub added_date: i64,
    /// Descriptive fields (name, description, type, presentLocation, ...).
    #[serde(flatten)]
    pub fields: Document,
}

impl Artifact {
    /// Builds a new record from a client payload. The creator identity comes
    /// from the verified principal, never from the payload.
    pub fn new(principal: &Principal, mut payload: Document) -> Self {
        let adder_name = payload
            .get_str("adderName")
            .ok()
            .map(|name| name.to_string());

        for field in PROTECTED_FIELDS {
            payload.remove(field);
        }

        Artifact {
            id: None,
            adder_email: principal.email.clone(),
            adder_name,
            like_count: 0,
            liked_by: Vec::new(),
            added_date: chrono::Utc::now().timestamp_millis(),
            fields: payload,
        }
    }
}

/// Strips protected fields from a partial-update payload.
pub fn sanitize_update(mut payload: Document) -> Document {
    for field in PROTECTED_FIELDS {
        payload.remove(field);
    }
    payload
}

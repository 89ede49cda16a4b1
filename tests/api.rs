use async_trait::async_trait;
use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use curio::auth::AuthError;
use curio::{AppState, ArtifactStore, MemoryArtifactStore, Principal, TokenVerifier, routes};
use mongodb::bson::oid::ObjectId;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Issuer stand-in with a fixed token table.
struct StaticVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticVerifier {
    fn new() -> Self {
        let mut tokens = HashMap::new();
        for (token, email) in [
            ("curator-token", "cur@museum.org"),
            ("visitor-token", "a@x.com"),
        ] {
            tokens.insert(
                token.to_string(),
                Principal {
                    email: email.to_string(),
                    uid: format!("uid-{email}"),
                    email_verified: true,
                },
            );
        }
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        if token == "expired-token" {
            return Err(AuthError::Expired);
        }
        self.tokens.get(token).cloned().ok_or(AuthError::Invalid)
    }
}

fn app() -> (Router, Arc<MemoryArtifactStore>) {
    let store = Arc::new(MemoryArtifactStore::new());
    let state = AppState::new(store.clone(), Arc::new(StaticVerifier::new()));
    let router = routes::register_routes().layer(Extension(state));
    (router, store)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_artifact(router: &Router, token: &str, payload: Value) -> String {
    let response = router
        .clone()
        .oneshot(request("POST", "/api/artifacts", Some(token), Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    body["insertedId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_requires_authentication() {
    let (router, _) = app();

    let response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/artifacts",
            None,
            Some(json!({ "name": "Sundial" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(request(
            "POST",
            "/api/artifacts",
            Some("bogus-token"),
            Some(json!({ "name": "Sundial" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_get_a_distinct_message() {
    let (router, _) = app();

    let response = router
        .oneshot(request(
            "POST",
            "/api/artifacts",
            Some("expired-token"),
            Some(json!({ "name": "Sundial" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn create_ignores_client_supplied_protected_fields() {
    let (router, store) = app();

    let id = create_artifact(
        &router,
        "curator-token",
        json!({
            "name": "Rosetta Stone",
            "likeCount": 999,
            "likedBy": ["spoof@x.com"],
            "adderEmail": "spoof@x.com",
        }),
    )
    .await;

    let stored = store
        .find_by_id(ObjectId::parse_str(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.adder_email, "cur@museum.org");
    assert_eq!(stored.like_count, 0);
    assert!(stored.liked_by.is_empty());
    assert_eq!(stored.fields.get_str("name").unwrap(), "Rosetta Stone");
}

#[tokio::test]
async fn get_artifact_distinguishes_bad_id_from_missing() {
    let (router, _) = app();

    let response = router
        .clone()
        .oneshot(request("GET", "/api/artifacts/not-an-id", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = ObjectId::new().to_hex();
    let response = router
        .oneshot(request("GET", &format!("/api/artifacts/{missing}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_is_owner_only_and_strips_protected_fields() {
    let (router, store) = app();
    let id = create_artifact(&router, "curator-token", json!({ "name": "Astrolabe" })).await;
    let uri = format!("/api/artifacts/{id}");

    // Non-owner gets 403 on an existing artifact.
    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &uri,
            Some("visitor-token"),
            Some(json!({ "name": "Stolen" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Missing id beats Forbidden, whoever asks.
    let missing = ObjectId::new().to_hex();
    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/artifacts/{missing}"),
            Some("visitor-token"),
            Some(json!({ "name": "Stolen" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Owner update applies, protected fields silently dropped.
    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &uri,
            Some("curator-token"),
            Some(json!({
                "description": "Brass instrument",
                "likeCount": 999,
                "adderEmail": "x@y.com",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = store
        .find_by_id(ObjectId::parse_str(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.like_count, 0);
    assert_eq!(stored.adder_email, "cur@museum.org");
    assert_eq!(
        stored.fields.get_str("description").unwrap(),
        "Brass instrument"
    );
}

#[tokio::test]
async fn delete_is_owner_only() {
    let (router, store) = app();
    let id = create_artifact(&router, "curator-token", json!({ "name": "Amphora" })).await;
    let uri = format!("/api/artifacts/{id}");

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some("visitor-token"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, Some("curator-token"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(
        store
            .find_by_id(ObjectId::parse_str(&id).unwrap())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn like_and_dislike_toggle_through_the_api() {
    let (router, store) = app();
    let id = create_artifact(&router, "curator-token", json!({ "name": "Sundial" })).await;
    let oid = ObjectId::parse_str(&id).unwrap();

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/artifacts/{id}/like"),
                Some("visitor-token"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = store.find_by_id(oid).await.unwrap().unwrap();
    assert_eq!(stored.like_count, 1);
    assert_eq!(stored.liked_by, vec!["a@x.com".to_string()]);

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/artifacts/{id}/dislike"),
                Some("visitor-token"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = store.find_by_id(oid).await.unwrap().unwrap();
    assert_eq!(stored.like_count, 0);
    assert!(stored.liked_by.is_empty());
}

#[tokio::test]
async fn toggles_require_authentication_but_not_ownership() {
    let (router, _) = app();
    let id = create_artifact(&router, "curator-token", json!({ "name": "Sundial" })).await;

    let response = router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/artifacts/{id}/like"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A non-owner principal may like freely.
    let response = router
        .oneshot(request(
            "PATCH",
            &format!("/api/artifacts/{id}/like"),
            Some("visitor-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_empty_for_missing_query() {
    let (router, _) = app();
    create_artifact(&router, "curator-token", json!({ "name": "Rosetta Stone" })).await;

    let response = router
        .clone()
        .oneshot(request("GET", "/api/artifacts/search", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    let response = router
        .oneshot(request("GET", "/api/artifacts/search?q=rosetta", None, None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn top_liked_returns_six_descending() {
    let (router, store) = app();

    for (i, count) in [5i64, 3, 8, 1, 9, 2, 7].into_iter().enumerate() {
        let id = create_artifact(
            &router,
            "curator-token",
            json!({ "name": format!("artifact-{i}") }),
        )
        .await;
        let oid = ObjectId::parse_str(&id).unwrap();
        for j in 0..count {
            store.add_like(oid, &format!("fan{j}@x.com")).await.unwrap();
        }
    }

    let response = router
        .oneshot(request("GET", "/api/artifacts/top-liked", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let counts: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["likeCount"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![9, 8, 7, 5, 3, 2]);
}

#[tokio::test]
async fn user_queries_use_the_principal_email_not_the_path() {
    let (router, _) = app();
    create_artifact(&router, "curator-token", json!({ "name": "Sundial" })).await;

    // Unauthenticated access is rejected.
    let response = router
        .clone()
        .oneshot(request("GET", "/api/artifacts/user/cur@museum.org", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The visitor asks for the curator's artifacts by path, but only their
    // own records come back.
    let response = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/artifacts/user/cur@museum.org",
            Some("visitor-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    let response = router
        .oneshot(request(
            "GET",
            "/api/artifacts/user/anything",
            Some("curator-token"),
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn liked_query_returns_artifacts_the_principal_likes() {
    let (router, store) = app();
    let id = create_artifact(&router, "curator-token", json!({ "name": "Astrolabe" })).await;
    store
        .add_like(ObjectId::parse_str(&id).unwrap(), "a@x.com")
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/artifacts/liked/ignored",
            Some("visitor-token"),
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = router
        .oneshot(request(
            "GET",
            "/api/artifacts/liked/ignored",
            Some("curator-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!([]));
}

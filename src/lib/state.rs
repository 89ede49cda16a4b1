use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::store::ArtifactStore;

/// Shared handler dependencies, injected via `axum::Extension`. Both seams
/// are trait objects so tests can swap in in-process fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArtifactStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArtifactStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}

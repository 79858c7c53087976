//! Shared application state for all routes.

use crate::repository::RepositoryProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Source of request-scoped repositories (PostgreSQL pool or in-memory store).
    pub repositories: Arc<dyn RepositoryProvider>,
    /// Absolute origin used for pagination links, without trailing slash.
    pub public_base_url: String,
}

impl AppState {
    pub fn new(repositories: Arc<dyn RepositoryProvider>, public_base_url: impl Into<String>) -> Self {
        AppState {
            repositories,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute collection URL, e.g. `http://localhost:5000/products/`.
    pub fn collection_url(&self, segment: &str) -> String {
        format!("{}/{}/", self.public_base_url, segment)
    }
}

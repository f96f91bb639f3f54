use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppResult,
    middleware::{make_span_with_request_id, request_id_middleware},
    models::Language,
    services::{metadata::MetadataProvider, ranker::DEFAULT_NUM_RECOMMENDATIONS, snapshot::SnapshotStore},
};

pub mod catalogs;
pub mod genres;
pub mod recommendations;
pub mod titles;

/// Shared state handed to every handler
pub struct AppState {
    pub snapshots: SnapshotStore,
    pub metadata: Option<Arc<dyn MetadataProvider>>,
    pub num_recommendations: usize,
}

impl AppState {
    pub fn new(snapshots: SnapshotStore) -> Self {
        Self {
            snapshots,
            metadata: None,
            num_recommendations: DEFAULT_NUM_RECOMMENDATIONS,
        }
    }

    pub fn with_metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn with_num_recommendations(mut self, count: usize) -> Self {
        self.num_recommendations = count;
        self
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", get(recommendations::recommend))
        .route("/titles/search", get(titles::search))
        .route("/titles/random", get(titles::random))
        .route("/genres", get(genres::list))
        .route("/catalogs/:language/reload", post(catalogs::reload))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Parses the optional `language` query parameter, defaulting to `all`
pub(crate) fn parse_language(raw: Option<&str>) -> AppResult<Language> {
    match raw {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Ok(Language::All),
    }
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::TitleCandidate,
    routes::{parse_language, AppState},
    services::title_search::{random_title, suggest_titles},
};

const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    language: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    language: Option<String>,
    seed: Option<u64>,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<String>>> {
    let language = parse_language(params.language.as_deref())?;
    let snapshot = state.snapshots.get_or_build(language).await?;

    let titles = suggest_titles(
        &params.q,
        snapshot.catalog(),
        params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    )?;
    Ok(Json(titles))
}

/// Handler for the "surprise me" endpoint
pub async fn random(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RandomQuery>,
) -> AppResult<Json<TitleCandidate>> {
    let language = parse_language(params.language.as_deref())?;
    let snapshot = state.snapshots.get_or_build(language).await?;

    random_title(snapshot.catalog(), params.seed)
        .map(|movie| Json(TitleCandidate::from(movie)))
        .ok_or_else(|| AppError::NotFound(format!("The {} catalog is empty", language)))
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::Language,
    routes::{parse_language, AppState},
};

#[derive(Debug, Deserialize)]
pub struct GenresQuery {
    language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub language: Language,
    pub genres: Vec<String>,
}

/// Lists the genre universe of a language's catalog, sorted
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenresQuery>,
) -> AppResult<Json<GenresResponse>> {
    let language = parse_language(params.language.as_deref())?;
    let snapshot = state.snapshots.get_or_build(language).await?;

    Ok(Json(GenresResponse {
        language,
        genres: snapshot.vectors.genres().to_vec(),
    }))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{GenreSelection, MovieId, RecommendationResponse, TitleCandidate},
    routes::{parse_language, AppState},
    services::{
        genre_filter::filter_by_genres,
        metadata::enrich_all,
        ranker::rank_neighbors,
        title_search::{candidates, resolve_title, TitleMatch},
    },
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: Option<String>,
    /// Picks one film when the title is shared by several
    pub id: Option<u64>,
    pub language: Option<String>,
    pub count: Option<usize>,
    /// Comma-separated genres, or `all`
    pub genres: Option<String>,
    #[serde(default)]
    pub details: bool,
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let language = parse_language(params.language.as_deref())?;
    let count = params.count.unwrap_or(state.num_recommendations);

    let snapshot = state.snapshots.get_or_build(language).await?;
    let catalog = snapshot.catalog();

    let seed_row = match (params.id, params.title.as_deref()) {
        (Some(id), _) => catalog.row_for_id(MovieId(id)),
        (None, Some(title)) => match resolve_title(title, catalog) {
            TitleMatch::NotFound => None,
            TitleMatch::Unique(row) => Some(row),
            TitleMatch::Ambiguous(rows) => {
                tracing::info!(
                    request_id = %request_id,
                    title = %title,
                    matches = rows.len(),
                    "Ambiguous seed title"
                );
                return Err(AppError::AmbiguousTitle {
                    title: title.to_string(),
                    candidates: candidates(&rows, catalog),
                });
            }
        },
        (None, None) => {
            return Err(AppError::InvalidInput(
                "Either 'title' or 'id' is required".to_string(),
            ))
        }
    };

    let Some(seed_row) = seed_row else {
        tracing::info!(request_id = %request_id, language = %language, "Seed not in catalog");
        return Ok(Json(RecommendationResponse {
            seed: None,
            language,
            cluster: None,
            recommendations: Vec::new(),
        }));
    };

    let mut ranked = rank_neighbors(seed_row, &snapshot.vectors, &snapshot.labeled, count);

    if let Some(raw) = params.genres.as_deref() {
        let selection = GenreSelection::parse(raw);
        let titles: Vec<String> = ranked.iter().map(|s| s.title.clone()).collect();
        let kept: HashSet<String> = filter_by_genres(&titles, &selection, catalog)
            .into_iter()
            .collect();
        ranked.retain(|s| kept.contains(&s.title));
    }

    if params.details {
        let movies = ranked
            .iter()
            .filter_map(|s| catalog.get(s.row).cloned())
            .collect();
        let details = enrich_all(state.metadata.clone(), movies).await;
        for (scored, d) in ranked.iter_mut().zip(details) {
            scored.details = Some(d);
        }
    }

    tracing::info!(
        request_id = %request_id,
        language = %language,
        seed_row,
        results = ranked.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        seed: catalog.get(seed_row).map(TitleCandidate::from),
        language,
        cluster: snapshot.labeled.label(seed_row),
        recommendations: ranked,
    }))
}

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, Movie, TitleCandidate},
};

/// How a user-supplied title maps onto catalog rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    NotFound,
    Unique(usize),
    /// Several films share the title; rows in catalog order
    Ambiguous(Vec<usize>),
}

/// Resolves an exact title to catalog rows
pub fn resolve_title(title: &str, catalog: &Catalog) -> TitleMatch {
    match catalog.rows_for_title(title) {
        [] => TitleMatch::NotFound,
        [row] => TitleMatch::Unique(*row),
        rows => TitleMatch::Ambiguous(rows.to_vec()),
    }
}

/// Candidates for an ambiguous title, for the client to choose from
pub fn candidates(rows: &[usize], catalog: &Catalog) -> Vec<TitleCandidate> {
    rows.iter()
        .filter_map(|row| catalog.get(*row))
        .map(TitleCandidate::from)
        .collect()
}

/// "Did you mean" suggestions: case-insensitive substring matches
///
/// Titles are returned once each, in catalog order.
pub fn suggest_titles(query: &str, catalog: &Catalog, limit: usize) -> AppResult<Vec<String>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let suggestions: Vec<String> = catalog
        .movies()
        .iter()
        .filter(|m| m.title.to_lowercase().contains(&needle))
        .filter(|m| seen.insert(m.title.as_str()))
        .take(limit)
        .map(|m| m.title.clone())
        .collect();

    tracing::debug!(query = %query, results = suggestions.len(), "Title search completed");

    Ok(suggestions)
}

/// Picks a random movie; a seed makes the pick reproducible
pub fn random_title(catalog: &Catalog, seed: Option<u64>) -> Option<&Movie> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    catalog.movies().choose(&mut rng)
}

use crate::{
    models::{MovieId, ScoredTitle},
    services::{clustering::LabeledCatalog, vectorizer::GenreVectorTable},
};

/// Neighbors considered per query
///
/// The seed itself counts toward this total, so the default yields up to ten
/// recommended titles.
pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 11;

/// Cosine distance between two vectors
///
/// Defined as 1.0 when either vector has no magnitude, i.e. a movie without
/// genres is unrelated to everything. The norms are combined under a single
/// square root so identical vectors are exactly 0.0 apart.
pub fn cosine_distance(u: &[f64], v: &[f64]) -> f64 {
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    let uu: f64 = u.iter().map(|a| a * a).sum();
    let vv: f64 = v.iter().map(|b| b * b).sum();

    if uu == 0.0 || vv == 0.0 {
        return 1.0;
    }

    1.0 - (dot / (uu * vv).sqrt()).clamp(-1.0, 1.0)
}

/// Titles most similar to `seed_title` within its cluster
///
/// Returns at most `count - 1` titles ordered by ascending distance, never
/// including the seed title. Unknown titles yield an empty list. When the
/// title occurs more than once the first catalog row is used; callers that
/// need a specific film should use [`recommend_by_id`].
pub fn recommend(
    seed_title: &str,
    vectors: &GenreVectorTable,
    labeled: &LabeledCatalog,
    count: usize,
) -> Vec<String> {
    let rows = labeled.catalog().rows_for_title(seed_title);
    let Some(&seed_row) = rows.first() else {
        tracing::debug!(title = %seed_title, "Seed title not in catalog");
        return Vec::new();
    };

    if rows.len() > 1 {
        tracing::warn!(
            title = %seed_title,
            matches = rows.len(),
            "Seed title is ambiguous, using the first catalog row"
        );
    }

    titles(rank_neighbors(seed_row, vectors, labeled, count))
}

/// Same as [`recommend`] but seeded from an explicit movie id
pub fn recommend_by_id(
    seed: MovieId,
    vectors: &GenreVectorTable,
    labeled: &LabeledCatalog,
    count: usize,
) -> Vec<String> {
    match labeled.catalog().row_for_id(seed) {
        Some(row) => titles(rank_neighbors(row, vectors, labeled, count)),
        None => Vec::new(),
    }
}

/// Ranks the seed row's cluster-mates by cosine distance
///
/// Ties keep catalog order. Every row sharing the seed's title is excluded.
pub fn rank_neighbors(
    seed_row: usize,
    vectors: &GenreVectorTable,
    labeled: &LabeledCatalog,
    count: usize,
) -> Vec<ScoredTitle> {
    let catalog = labeled.catalog();
    let (Some(seed), Some(label), Some(seed_vector)) = (
        catalog.get(seed_row),
        labeled.label(seed_row),
        vectors.vector(seed_row),
    ) else {
        return Vec::new();
    };

    let mut scored: Vec<(usize, f64)> = labeled
        .clusters()
        .members(label)
        .filter(|&row| row != seed_row)
        .filter(|&row| catalog.get(row).is_some_and(|m| m.title != seed.title))
        .filter_map(|row| {
            vectors
                .vector(row)
                .map(|v| (row, cosine_distance(v, seed_vector)))
        })
        .collect();

    // sort_by is stable, so equal distances stay in catalog order
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    scored
        .into_iter()
        .take(count.saturating_sub(1))
        .filter_map(|(row, distance)| {
            catalog.get(row).map(|movie| ScoredTitle {
                row,
                id: movie.id,
                title: movie.title.clone(),
                genres: movie.genres.clone(),
                distance,
                details: None,
            })
        })
        .collect()
}

fn titles(scored: Vec<ScoredTitle>) -> Vec<String> {
    scored.into_iter().map(|s| s.title).collect()
}

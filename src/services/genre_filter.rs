use std::collections::BTreeSet;

use crate::models::{Catalog, GenreSelection};

/// Keeps the titles that carry every selected genre
///
/// Selecting `All`, or explicitly every genre in the catalog, returns the
/// recommendations unchanged. Otherwise titles missing from the catalog are
/// dropped, and a genre the catalog has never seen matches nothing.
pub fn filter_by_genres(
    recommendations: &[String],
    selection: &GenreSelection,
    catalog: &Catalog,
) -> Vec<String> {
    let selected: BTreeSet<String> = match selection {
        GenreSelection::All => return recommendations.to_vec(),
        GenreSelection::Only(genres) => genres.iter().map(|g| g.to_lowercase()).collect(),
    };

    if !selected.is_empty() && selected == genre_universe(catalog) {
        return recommendations.to_vec();
    }

    recommendations
        .iter()
        .filter(|title| {
            catalog
                .find_title(title)
                .is_some_and(|movie| selected.iter().all(|g| movie.has_genre(g)))
        })
        .cloned()
        .collect()
}

/// Every genre tag present in the catalog
pub fn genre_universe(catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .movies()
        .iter()
        .flat_map(|m| m.genres.iter().cloned())
        .collect()
}

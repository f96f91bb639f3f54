use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};

use crate::models::Catalog;

/// Multi-hot genre encoding of a catalog, one row per catalog row
///
/// Columns are the sorted distinct genre tags of the catalog, so two tables
/// built from the same catalog are identical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreVectorTable {
    genres: Vec<String>,
    columns: HashMap<String, usize>,
    /// Row-major, one row per catalog row
    matrix: Array2<f64>,
}

impl GenreVectorTable {
    /// Genre universe in column order
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn column(&self, genre: &str) -> Option<usize> {
        self.columns.get(genre).copied()
    }

    pub fn dimensions(&self) -> usize {
        self.genres.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vector(&self, row: usize) -> Option<&[f64]> {
        if row >= self.len() {
            return None;
        }

        let width = self.dimensions();
        self.matrix
            .as_slice()
            .map(|data| &data[row * width..(row + 1) * width])
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

/// Builds the genre vector table for a catalog
pub fn vectorize_genres(catalog: &Catalog) -> GenreVectorTable {
    let universe: BTreeSet<&str> = catalog
        .movies()
        .iter()
        .flat_map(|m| m.genres.iter().map(String::as_str))
        .collect();

    let genres: Vec<String> = universe.into_iter().map(str::to_string).collect();
    let columns: HashMap<String, usize> = genres
        .iter()
        .enumerate()
        .map(|(i, g)| (g.clone(), i))
        .collect();

    let mut matrix = Array2::zeros((catalog.len(), genres.len()));
    for (row, movie) in catalog.movies().iter().enumerate() {
        for genre in &movie.genres {
            if let Some(&col) = columns.get(genre) {
                matrix[[row, col]] = 1.0;
            }
        }
    }

    tracing::debug!(
        rows = catalog.len(),
        dimensions = genres.len(),
        "Genre vectors built"
    );

    GenreVectorTable {
        genres,
        columns,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;
    use crate::services::ranker::cosine_distance;

    fn movie(title: &str, genres: &[&str]) -> Movie {
        Movie {
            id: None,
            title: title.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            original_language: None,
            release_date: None,
            status: "Released".to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            movie("Inception", &["action", "science fiction", "adventure"]),
            movie("Interstellar", &["adventure", "drama", "science fiction"]),
            movie("Tenet", &["science fiction", "action", "adventure"]),
            movie("Blank", &[]),
        ])
    }

    #[test]
    fn test_columns_are_sorted_universe() {
        let table = vectorize_genres(&catalog());
        assert_eq!(
            table.genres(),
            &["action", "adventure", "drama", "science fiction"]
        );
        assert_eq!(table.column("drama"), Some(2));
        assert_eq!(table.column("horror"), None);
    }

    #[test]
    fn test_multi_hot_rows() {
        let table = vectorize_genres(&catalog());
        assert_eq!(table.len(), 4);
        assert_eq!(table.vector(0).unwrap(), &[1.0, 1.0, 0.0, 1.0]);
        assert_eq!(table.vector(1).unwrap(), &[0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_identical_genre_sets_are_bit_identical() {
        let table = vectorize_genres(&catalog());
        let a = table.vector(0).unwrap();
        let b = table.vector(2).unwrap();
        assert!(a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn test_identical_genre_sets_have_zero_distance() {
        let table = vectorize_genres(&catalog());
        let d = cosine_distance(table.vector(0).unwrap(), table.vector(2).unwrap());
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_row_out_of_range() {
        let table = vectorize_genres(&catalog());
        assert!(table.vector(4).is_none());
        assert_eq!(table.matrix().dim(), (4, 4));
    }

    #[test]
    fn test_no_genres_is_zero_vector() {
        let table = vectorize_genres(&catalog());
        assert!(table.vector(3).unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_duplicate_tag_is_still_one() {
        let table = vectorize_genres(&Catalog::new(vec![movie("Twice", &["drama", "drama"])]));
        assert_eq!(table.vector(0).unwrap(), &[1.0]);
    }

    #[test]
    fn test_empty_catalog() {
        let table = vectorize_genres(&Catalog::default());
        assert!(table.is_empty());
        assert_eq!(table.dimensions(), 0);
    }
}

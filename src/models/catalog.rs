use std::collections::HashMap;

use super::{Movie, MovieId};

/// Cleaned, ordered set of movie rows for one language selection
///
/// Row order is the source order and doubles as the tie-break order for
/// ranking. Titles are not assumed unique: the title index keeps every
/// matching row.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
    by_title: HashMap<String, Vec<usize>>,
    by_id: HashMap<MovieId, usize>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        let mut by_title: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_id = HashMap::new();

        for (row, movie) in movies.iter().enumerate() {
            by_title.entry(movie.title.clone()).or_default().push(row);
            if let Some(id) = movie.id {
                // First occurrence wins for duplicated ids
                by_id.entry(id).or_insert(row);
            }
        }

        Self {
            movies,
            by_title,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    /// All rows carrying exactly this title, in catalog order
    pub fn rows_for_title(&self, title: &str) -> &[usize] {
        self.by_title.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First row carrying this title
    pub fn find_title(&self, title: &str) -> Option<&Movie> {
        self.rows_for_title(title)
            .first()
            .and_then(|row| self.movies.get(*row))
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.by_title.contains_key(title)
    }

    pub fn row_for_id(&self, id: MovieId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }
}

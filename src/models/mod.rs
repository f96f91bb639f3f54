use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

mod catalog;
mod movie;

pub use catalog::Catalog;
pub use movie::{Language, Movie, MovieId};

/// Genres a recommendation list is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreSelection {
    /// Sentinel that expands to every genre in the catalog
    All,
    /// Every listed genre must be present (logical AND)
    Only(BTreeSet<String>),
}

impl GenreSelection {
    /// Parses a comma-separated list; `all` anywhere in the list selects everything
    pub fn parse(raw: &str) -> Self {
        let tags: BTreeSet<String> = raw
            .split(',')
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();

        if tags.contains("all") {
            GenreSelection::All
        } else {
            GenreSelection::Only(tags)
        }
    }
}

/// Identifies one catalog row to a client, used to disambiguate titles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleCandidate {
    pub id: Option<MovieId>,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
}

impl From<&Movie> for TitleCandidate {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date,
            genres: movie.genres.clone(),
        }
    }
}

/// A recommended movie with its distance to the seed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredTitle {
    /// Catalog row the title was ranked from
    #[serde(skip)]
    pub row: usize,
    pub id: Option<MovieId>,
    pub title: String,
    pub genres: Vec<String>,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MovieDetails>,
}

/// Response for the recommendations endpoint
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// None when the seed title is not in the catalog
    pub seed: Option<TitleCandidate>,
    pub language: Language,
    pub cluster: Option<usize>,
    pub recommendations: Vec<ScoredTitle>,
}

/// Summary of a freshly published catalog snapshot
#[derive(Debug, Serialize)]
pub struct SnapshotSummary {
    pub language: Language,
    pub movies: usize,
    pub genres: usize,
    pub clusters: usize,
    pub built_at: chrono::DateTime<chrono::Utc>,
}

/// Display-only movie details
///
/// Never used for ranking; falls back to placeholders when the lookup fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: Option<MovieId>,
    pub poster: String,
    pub release_date: String,
    pub rating: String,
    pub overview: String,
    pub genres: String,
}

pub const DEFAULT_POSTER: &str =
    "https://via.placeholder.com/500x750.png?text=No+Poster+Available";
pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

impl MovieDetails {
    pub fn placeholder(id: Option<MovieId>) -> Self {
        Self {
            id,
            poster: DEFAULT_POSTER.to_string(),
            release_date: "Unknown".to_string(),
            rating: "N/A".to_string(),
            overview: "No overview available".to_string(),
            genres: "Unknown".to_string(),
        }
    }
}

// ============================================================================
// TMDb API Types
// ============================================================================

/// Response from GET /3/movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// Response from GET /3/search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
}

impl From<TmdbMovie> for MovieDetails {
    fn from(movie: TmdbMovie) -> Self {
        let placeholder = MovieDetails::placeholder(Some(MovieId(movie.id)));

        let genres = if movie.genres.is_empty() {
            placeholder.genres
        } else {
            movie
                .genres
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            id: Some(MovieId(movie.id)),
            poster: movie
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", TMDB_IMAGE_BASE_URL, p))
                .unwrap_or(placeholder.poster),
            release_date: movie
                .release_date
                .filter(|d| !d.is_empty())
                .unwrap_or(placeholder.release_date),
            rating: movie
                .vote_average
                .map(|r| r.to_string())
                .unwrap_or(placeholder.rating),
            overview: movie
                .overview
                .filter(|o| !o.is_empty())
                .unwrap_or(placeholder.overview),
            genres,
        }
    }
}

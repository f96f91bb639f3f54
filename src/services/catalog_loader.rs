//! Catalog loading and cleaning.
//!
//! Every language selection goes through the same pipeline: drop rows without
//! a title or genre field, keep only released movies, normalize genres to
//! lowercase tags, then optionally restrict to one original language.
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Catalog, Language, Movie, MovieId},
};

const RELEASED_STATUS: &str = "Released";
const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "title",
    "genres",
    "original_language",
    "status",
    "release_date",
];
const GENRE_DELIMITER: char = ',';

/// Where a catalog's CSV text comes from
#[derive(Debug, Clone)]
pub enum CatalogInput {
    File(PathBuf),
    /// CSV text held in memory, labelled for error messages
    Inline { name: String, csv: Arc<str> },
}

impl CatalogInput {
    pub fn inline(name: impl Into<String>, csv: impl Into<Arc<str>>) -> Self {
        CatalogInput::Inline {
            name: name.into(),
            csv: csv.into(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            CatalogInput::File(path) => path.display().to_string(),
            CatalogInput::Inline { name, .. } => name.clone(),
        }
    }

    /// False for a file path that does not exist
    pub fn is_available(&self) -> bool {
        match self {
            CatalogInput::File(path) => path.is_file(),
            CatalogInput::Inline { .. } => true,
        }
    }

    fn open(&self) -> AppResult<Box<dyn Read + Send>> {
        match self {
            CatalogInput::File(path) => {
                let file = File::open(path).map_err(|e| AppError::catalog_load(self.name(), e))?;
                Ok(Box::new(file))
            }
            CatalogInput::Inline { csv, .. } => {
                Ok(Box::new(Cursor::new(csv.as_bytes().to_vec())))
            }
        }
    }
}

/// The general catalog plus optional pre-filtered language catalogs
#[derive(Debug, Clone)]
pub struct CatalogSources {
    pub general: CatalogInput,
    pub languages: HashMap<Language, CatalogInput>,
}

impl CatalogSources {
    pub fn new(general: CatalogInput) -> Self {
        Self {
            general,
            languages: HashMap::new(),
        }
    }

    pub fn with_language(mut self, language: Language, input: CatalogInput) -> Self {
        self.languages.insert(language, input);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let mut sources = Self::new(CatalogInput::File(config.data_dir.join(&config.catalog_file)));

        for (language, file) in [
            (Language::Filipino, &config.filipino_file),
            (Language::Korean, &config.korean_file),
            (Language::Japanese, &config.japanese_file),
        ] {
            if !file.trim().is_empty() {
                sources = sources.with_language(language, CatalogInput::File(config.data_dir.join(file)));
            }
        }

        sources
    }
}

/// Raw CSV row; every other column in the file is ignored
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    original_language: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    MissingTitle,
    MissingGenres,
    NotReleased,
    OtherLanguage,
}

/// Per-source counters reported after a load
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub kept: usize,
    pub missing_title: usize,
    pub missing_genres: usize,
    pub not_released: usize,
    pub other_language: usize,
}

impl LoadStats {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingTitle => self.missing_title += 1,
            DropReason::MissingGenres => self.missing_genres += 1,
            DropReason::NotReleased => self.not_released += 1,
            DropReason::OtherLanguage => self.other_language += 1,
        }
    }
}

/// Loads and cleans the catalog for a language selection
///
/// `All` and `English` read the general catalog. Other languages read their
/// pre-filtered file when one is configured and present, otherwise the
/// general catalog filtered by ISO code. Any read or parse failure is fatal.
pub fn load_catalog(sources: &CatalogSources, language: Language) -> AppResult<Catalog> {
    let (input, language_filter) = match language {
        Language::All => (&sources.general, None),
        Language::English => (&sources.general, language.code()),
        other => match sources.languages.get(&other) {
            Some(input) if input.is_available() => (input, None),
            Some(input) => {
                tracing::warn!(
                    language = %other,
                    source = %input.name(),
                    "Language catalog not found, filtering the general catalog instead"
                );
                (&sources.general, other.code())
            }
            None => (&sources.general, other.code()),
        },
    };

    let reader = input.open()?;
    let (catalog, stats) = parse_catalog(reader, &input.name(), language_filter)?;

    tracing::info!(
        language = %language,
        source = %input.name(),
        rows_read = stats.rows_read,
        kept = stats.kept,
        missing_title = stats.missing_title,
        missing_genres = stats.missing_genres,
        not_released = stats.not_released,
        other_language = stats.other_language,
        "Catalog loaded"
    );

    Ok(catalog)
}

/// Parses CSV text into a cleaned catalog
///
/// `language_filter` is an `original_language` code rows must match.
pub fn parse_catalog<R: Read>(
    reader: R,
    source_name: &str,
    language_filter: Option<&str>,
) -> AppResult<(Catalog, LoadStats)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::catalog_load(source_name, e))?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(AppError::catalog_load(
            source_name,
            format!("missing required column '{}'", missing),
        ));
    }

    let mut stats = LoadStats::default();
    let mut movies = Vec::new();

    for result in csv_reader.deserialize::<RawMovieRow>() {
        let raw = result.map_err(|e| AppError::catalog_load(source_name, e))?;
        stats.rows_read += 1;

        match clean_row(raw, language_filter) {
            Ok(movie) => movies.push(movie),
            Err(reason) => stats.record(reason),
        }
    }

    stats.kept = movies.len();
    Ok((Catalog::new(movies), stats))
}

fn clean_row(raw: RawMovieRow, language_filter: Option<&str>) -> Result<Movie, DropReason> {
    let title = non_blank(raw.title).ok_or(DropReason::MissingTitle)?;
    let genres_field = non_blank(raw.genres).ok_or(DropReason::MissingGenres)?;

    let status = non_blank(raw.status).unwrap_or_default();
    if status != RELEASED_STATUS {
        return Err(DropReason::NotReleased);
    }

    let original_language = non_blank(raw.original_language);
    if let Some(code) = language_filter {
        if original_language.as_deref() != Some(code) {
            return Err(DropReason::OtherLanguage);
        }
    }

    Ok(Movie {
        id: raw.id.as_deref().and_then(parse_movie_id),
        title,
        genres: split_genres(&genres_field),
        original_language,
        release_date: raw
            .release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        status,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Lowercases a delimited genre field into tags; yields nothing for junk input
pub fn split_genres(field: &str) -> Vec<String> {
    field
        .to_lowercase()
        .split(GENRE_DELIMITER)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts `27205` as well as float-formatted ids such as `27205.0`
fn parse_movie_id(raw: &str) -> Option<MovieId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(MovieId(id));
    }

    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
        .map(|f| MovieId(f as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERAL_CSV: &str = "\
id,title,vote_average,status,release_date,revenue,genres,original_language,budget
27205,Inception,8.4,Released,2010-07-15,825532764,\"Action, Science Fiction, Adventure\",en,160000000
157336,Interstellar,8.4,Released,2014-11-05,701729206,\"Adventure, Drama, Science Fiction\",en,165000000
1,,5.0,Released,2000-01-01,0,Drama,en,0
2,No Genres,5.0,Released,2000-01-01,0,,en,0
3,Upcoming,0.0,Post Production,2030-01-01,0,Drama,en,0
496243,Parasite,8.5,Released,2019-05-30,257591776,\"Comedy, Thriller, Drama\",ko,11363000
4,Odd Genres,6.0,Released,not-a-date,0,\" , \",en,0
";

    fn sources() -> CatalogSources {
        CatalogSources::new(CatalogInput::inline("general.csv", GENERAL_CSV))
    }

    #[test]
    fn test_all_applies_cleaning() {
        let catalog = load_catalog(&sources(), Language::All).unwrap();
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Inception", "Interstellar", "Parasite", "Odd Genres"]);
    }

    #[test]
    fn test_genres_lowercased_and_split() {
        let catalog = load_catalog(&sources(), Language::All).unwrap();
        let inception = catalog.find_title("Inception").unwrap();
        assert_eq!(
            inception.genres,
            vec!["action", "science fiction", "adventure"]
        );
        assert_eq!(inception.id, Some(MovieId(27205)));
        assert_eq!(
            inception.release_date,
            NaiveDate::from_ymd_opt(2010, 7, 15)
        );
    }

    #[test]
    fn test_present_but_empty_genre_field_is_kept_with_no_tags() {
        let catalog = load_catalog(&sources(), Language::All).unwrap();
        let odd = catalog.find_title("Odd Genres").unwrap();
        assert!(odd.genres.is_empty());
        assert_eq!(odd.release_date, None);
    }

    #[test]
    fn test_parse_stats() {
        let (_, stats) = parse_catalog(GENERAL_CSV.as_bytes(), "general.csv", None).unwrap();
        assert_eq!(
            stats,
            LoadStats {
                rows_read: 7,
                kept: 4,
                missing_title: 1,
                missing_genres: 1,
                not_released: 1,
                other_language: 0,
            }
        );
    }

    #[test]
    fn test_english_filters_original_language() {
        let catalog = load_catalog(&sources(), Language::English).unwrap();
        assert!(catalog.contains_title("Inception"));
        assert!(!catalog.contains_title("Parasite"));
    }

    #[test]
    fn test_language_without_file_filters_general_catalog() {
        let catalog = load_catalog(&sources(), Language::Korean).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_title("Parasite"));
    }

    #[test]
    fn test_language_file_gets_same_cleaning() {
        let korean = "\
id,title,genres,original_language,status,release_date
496243,Parasite,\"Comedy, Thriller, Drama\",ko,Released,2019-05-30
1,Unfinished,Drama,ko,In Production,
2,Oldboy,\"Drama, Thriller, Mystery, Action\",ko,Released,2003-11-21
";
        let sources = sources().with_language(
            Language::Korean,
            CatalogInput::inline("korean.csv", korean),
        );

        let catalog = load_catalog(&sources, Language::Korean).unwrap();
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Parasite", "Oldboy"]);
    }

    #[test]
    fn test_absent_language_file_falls_back_to_general_catalog() {
        let sources = sources().with_language(
            Language::Korean,
            CatalogInput::File(PathBuf::from("/definitely/not/here/korean_movies.csv")),
        );

        let catalog = load_catalog(&sources, Language::Korean).unwrap();
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Parasite"]);
    }

    #[test]
    fn test_missing_file_is_fatal_and_names_source() {
        let sources = CatalogSources::new(CatalogInput::File(PathBuf::from(
            "/definitely/not/here/movies.csv",
        )));

        let err = load_catalog(&sources, Language::All).unwrap_err();
        match err {
            AppError::CatalogLoad { source_name, .. } => {
                assert_eq!(source_name, "/definitely/not/here/movies.csv")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_csv_is_fatal() {
        let csv = "id,title,genres,original_language,status,release_date\n\
                   1,A,Drama,en,Released,2000-01-01\n\
                   2,B\n";
        let err = parse_catalog(csv.as_bytes(), "broken.csv", None).unwrap_err();
        assert!(matches!(err, AppError::CatalogLoad { .. }));
    }

    #[test]
    fn test_missing_status_column_is_fatal() {
        let csv = "\
id,title,genres,original_language,release_date
496243,Parasite,\"Comedy, Thriller, Drama\",ko,2019-05-30
";
        let err = parse_catalog(csv.as_bytes(), "korean.csv", None).unwrap_err();
        match err {
            AppError::CatalogLoad {
                source_name,
                reason,
            } => {
                assert_eq!(source_name, "korean.csv");
                assert!(reason.contains("'status'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_title_column_is_fatal() {
        let csv = "id,name,genres,original_language,status,release_date\n";
        let err = parse_catalog(csv.as_bytes(), "general.csv", None).unwrap_err();
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn test_header_only_file_is_empty_catalog() {
        let csv = "id,title,genres,original_language,status,release_date\n";
        let (catalog, stats) = parse_catalog(csv.as_bytes(), "empty.csv", None).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(stats.rows_read, 0);
    }

    #[test]
    fn test_parse_movie_id_variants() {
        assert_eq!(parse_movie_id("27205"), Some(MovieId(27205)));
        assert_eq!(parse_movie_id("27205.0"), Some(MovieId(27205)));
        assert_eq!(parse_movie_id("27205.5"), None);
        assert_eq!(parse_movie_id("abc"), None);
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("Action, Science Fiction"), vec!["action", "science fiction"]);
        assert!(split_genres(" , ").is_empty());
    }
}

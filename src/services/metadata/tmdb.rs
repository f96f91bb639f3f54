//! TMDb metadata provider
//!
//! Looks movies up by their catalog id when one is known, otherwise searches
//! TMDb by title and takes the first hit.
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Movie, MovieDetails, MovieId, TmdbMovie, TmdbSearchResponse},
    services::metadata::MetadataProvider,
};

const DETAILS_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn details_url(&self, id: MovieId) -> String {
        format!("{}/3/movie/{}", self.api_url, id)
    }

    fn search_url(&self) -> String {
        format!("{}/3/search/movie", self.api_url)
    }

    fn cache_key(movie: &Movie) -> CacheKey {
        match movie.id {
            Some(id) => CacheKey::MovieDetails(id),
            None => CacheKey::MovieDetailsByTitle(movie.title.clone()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Resolves a title to a TMDb id via the search endpoint
    async fn search_id(&self, title: &str) -> AppResult<MovieId> {
        let search: TmdbSearchResponse = self
            .get_json(&self.search_url(), &[("query", title)])
            .await?;

        search
            .results
            .first()
            .map(|r| MovieId(r.id))
            .ok_or_else(|| AppError::NotFound(format!("No TMDb match for '{}'", title)))
    }

    async fn fetch_uncached(&self, movie: &Movie) -> AppResult<MovieDetails> {
        let id = match movie.id {
            Some(id) => id,
            None => self.search_id(&movie.title).await?,
        };

        let tmdb_movie: TmdbMovie = self.get_json(&self.details_url(id), &[]).await?;
        let details = MovieDetails::from(tmdb_movie);

        tracing::debug!(
            title = %movie.title,
            tmdb_id = %id,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_details(&self, movie: &Movie) -> AppResult<MovieDetails> {
        let key = Self::cache_key(movie);
        cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
            self.fetch_uncached(movie).await
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TmdbProvider {
        TmdbProvider::new(
            "test_key".to_string(),
            "http://tmdb.test/".to_string(),
            None,
        )
    }

    fn movie(id: Option<u64>, title: &str) -> Movie {
        Movie {
            id: id.map(MovieId),
            title: title.to_string(),
            genres: vec![],
            original_language: None,
            release_date: None,
            status: "Released".to_string(),
        }
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let provider = provider();
        assert_eq!(provider.details_url(MovieId(27205)), "http://tmdb.test/3/movie/27205");
        assert_eq!(provider.search_url(), "http://tmdb.test/3/search/movie");
    }

    #[test]
    fn test_cache_key_prefers_id() {
        assert_eq!(
            TmdbProvider::cache_key(&movie(Some(27205), "Inception")),
            CacheKey::MovieDetails(MovieId(27205))
        );
        assert_eq!(
            TmdbProvider::cache_key(&movie(None, "Inception")),
            CacheKey::MovieDetailsByTitle("Inception".to_string())
        );
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{"page": 1, "results": [{"id": 27205, "title": "Inception"}], "total_results": 1}"#;
        let search: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(search.results.len(), 1);
        assert_eq!(search.results[0].id, 27205);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        let provider = TmdbProvider::new(
            "test_key".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        );

        let result = provider.fetch_details(&movie(Some(27205), "Inception")).await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }
}

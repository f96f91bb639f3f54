use serde::Deserialize;
use std::path::PathBuf;

use crate::models::Language;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the catalog CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// General TMDb catalog, used for `all` and `english`
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Pre-filtered language catalogs; empty means "filter the general catalog"
    #[serde(default = "default_filipino_file")]
    pub filipino_file: String,

    #[serde(default = "default_korean_file")]
    pub korean_file: String,

    #[serde(default = "default_japanese_file")]
    pub japanese_file: String,

    /// Number of k-means clusters
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    /// Seed for k-means++ initialization
    #[serde(default = "default_cluster_seed")]
    pub cluster_seed: u64,

    /// Neighbors considered per query, seed included
    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,

    /// TMDb API key; metadata enrichment is disabled without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Redis connection URL for the metadata cache
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated languages whose snapshots are built at startup
    #[serde(default = "default_preload_languages")]
    pub preload_languages: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_catalog_file() -> String {
    "TMDB_movie_dataset_v11.csv".to_string()
}

fn default_filipino_file() -> String {
    "ph_movies.csv".to_string()
}

fn default_korean_file() -> String {
    "korean_movies.csv".to_string()
}

fn default_japanese_file() -> String {
    "japanese_movies.csv".to_string()
}

fn default_cluster_count() -> usize {
    10
}

fn default_cluster_seed() -> u64 {
    42
}

fn default_num_recommendations() -> usize {
    11
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_preload_languages() -> String {
    "all".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Languages to build at startup; unknown names are rejected
    pub fn preload_languages(&self) -> anyhow::Result<Vec<Language>> {
        self.preload_languages
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Language>().map_err(|e| anyhow::anyhow!("{}", e)))
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: Vec<(&str, &str)>) -> Config {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter::<_, Config>(vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(vec![]);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.catalog_file, "TMDB_movie_dataset_v11.csv");
        assert_eq!(config.cluster_count, 10);
        assert_eq!(config.cluster_seed, 42);
        assert_eq!(config.num_recommendations, 11);
        assert!(config.tmdb_api_key.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(vec![
            ("CLUSTER_COUNT", "4"),
            ("KOREAN_FILE", ""),
            ("TMDB_API_KEY", "secret"),
            ("PORT", "8080"),
        ]);
        assert_eq!(config.cluster_count, 4);
        assert_eq!(config.korean_file, "");
        assert_eq!(config.tmdb_api_key.as_deref(), Some("secret"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_preload_languages() {
        let config = config_from(vec![("PRELOAD_LANGUAGES", "all, Korean")]);
        assert_eq!(
            config.preload_languages().unwrap(),
            vec![Language::All, Language::Korean]
        );

        let bad = config_from(vec![("PRELOAD_LANGUAGES", "all,elvish")]);
        assert!(bad.preload_languages().is_err());
    }
}

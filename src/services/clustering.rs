//! K-means clustering of genre vectors.
//!
//! Fitting is delegated to `linfa-clustering` with k-means++ seeding. The RNG
//! is a `Xoshiro256Plus` seeded from the configuration, so a fit is
//! reproducible.
use linfa::{
    traits::{Fit, Predict},
    DatasetBase,
};
use linfa_clustering::{KMeans, KMeansInit};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::{
    error::{AppError, AppResult},
    models::Catalog,
    services::vectorizer::GenreVectorTable,
};

pub const DEFAULT_CLUSTER_COUNT: usize = 10;
pub const DEFAULT_CLUSTER_SEED: u64 = 42;

/// K-means hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    pub k: usize,
    pub seed: u64,
    pub max_iter: u64,
    /// Independent seedings tried; the lowest inertia wins
    pub n_runs: usize,
    /// Stop once the summed centroid shift falls below this
    pub tol: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            seed: DEFAULT_CLUSTER_SEED,
            max_iter: 300,
            n_runs: 10,
            tol: 1e-4,
        }
    }
}

impl KMeansConfig {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            ..Self::default()
        }
    }
}

/// Labels and centroids taken from a fitted model
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    inertia: f64,
}

impl ClusterAssignment {
    fn empty(dims: usize) -> Self {
        Self {
            labels: Vec::new(),
            centroids: Array2::zeros((0, dims)),
            inertia: 0.0,
        }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, row: usize) -> Option<usize> {
        self.labels.get(row).copied()
    }

    /// Centroids as rows, one per cluster
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Effective number of clusters
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Sum of squared distances of rows to their centroid
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Rows carrying the given label, in row order
    pub fn members(&self, label: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, l)| **l == label)
            .map(|(row, _)| row)
    }
}

/// A catalog together with the cluster label of each row
#[derive(Debug, Clone)]
pub struct LabeledCatalog {
    catalog: Catalog,
    clusters: ClusterAssignment,
}

impl LabeledCatalog {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn clusters(&self) -> &ClusterAssignment {
        &self.clusters
    }

    pub fn label(&self, row: usize) -> Option<usize> {
        self.clusters.label(row)
    }
}

/// Partitions catalog rows into `config.k` clusters by genre vector
pub fn assign_clusters(
    catalog: Catalog,
    vectors: &GenreVectorTable,
    config: &KMeansConfig,
) -> AppResult<LabeledCatalog> {
    if vectors.len() != catalog.len() {
        return Err(AppError::Internal(format!(
            "Genre vector table has {} rows but catalog has {}",
            vectors.len(),
            catalog.len()
        )));
    }

    let clusters = fit_kmeans(vectors.matrix(), config)?;

    tracing::info!(
        rows = catalog.len(),
        k = clusters.k(),
        inertia = clusters.inertia(),
        "Catalog clustered"
    );

    Ok(LabeledCatalog { catalog, clusters })
}

/// Fits k-means to the rows of `data`
///
/// The cluster count is reduced to the row count when there are fewer rows.
/// Fewer distinct rows than clusters is fine: the surplus clusters stay
/// empty and keep their seeded centroid.
pub fn fit_kmeans(data: &Array2<f64>, config: &KMeansConfig) -> AppResult<ClusterAssignment> {
    if config.k == 0 {
        return Err(AppError::InvalidInput(
            "Cluster count must be at least 1".to_string(),
        ));
    }

    let (rows, dims) = data.dim();
    if rows == 0 {
        return Ok(ClusterAssignment::empty(dims));
    }

    let k = if rows < config.k {
        tracing::warn!(
            rows,
            requested = config.k,
            "Fewer rows than clusters, reducing cluster count"
        );
        rows
    } else {
        config.k
    };

    // Zero-width rows are all the same point
    if dims == 0 {
        return Ok(ClusterAssignment {
            labels: vec![0; rows],
            centroids: Array2::zeros((k, 0)),
            inertia: 0.0,
        });
    }

    let dataset = DatasetBase::from(data.view());
    let model = KMeans::params_with_rng(k, Xoshiro256Plus::seed_from_u64(config.seed))
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(config.n_runs)
        .max_n_iterations(config.max_iter)
        .tolerance(config.tol)
        .fit(&dataset)
        .map_err(|e| AppError::Internal(format!("K-means fit failed: {}", e)))?;

    let labels: Array1<usize> = model.predict(data);

    Ok(ClusterAssignment {
        labels: labels.to_vec(),
        centroids: model.centroids().to_owned(),
        inertia: model.inertia(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;
    use crate::services::vectorizer::vectorize_genres;
    use ndarray::array;

    /// True when both labelings group rows identically, whatever the label values
    fn same_partition(a: &[usize], b: &[usize]) -> bool {
        a.len() == b.len()
            && (0..a.len()).all(|i| (0..a.len()).all(|j| (a[i] == a[j]) == (b[i] == b[j])))
    }

    fn blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1],
        ]
    }

    fn movie(i: usize, genres: &[&str]) -> Movie {
        Movie {
            id: None,
            title: format!("Movie {i}"),
            genres: genres.iter().map(|s| s.to_string()).collect(),
            original_language: None,
            release_date: None,
            status: "Released".to_string(),
        }
    }

    #[test]
    fn test_separates_obvious_groups() {
        let result = fit_kmeans(&blobs(), &KMeansConfig::new(2, 42)).unwrap();
        let labels = result.labels();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(result.k(), 2);
        assert_eq!(result.centroids().dim(), (2, 2));
    }

    #[test]
    fn test_same_seed_same_partition() {
        let data = Array2::from_shape_fn((40, 3), |(i, j)| match j {
            0 => (i % 7) as f64,
            1 => (i % 3) as f64,
            _ => ((i * 5) % 11) as f64,
        });
        let config = KMeansConfig::new(5, 42);

        let first = fit_kmeans(&data, &config).unwrap();
        let second = fit_kmeans(&data, &config).unwrap();

        assert!(same_partition(first.labels(), second.labels()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_fewer_patterns_than_clusters() {
        let patterns = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 1.0]];
        let data = Array2::from_shape_fn((12, 3), |(i, j)| patterns[i % 3][j]);

        let result = fit_kmeans(&data, &KMeansConfig::new(10, 42)).unwrap();

        assert_eq!(result.k(), 10);
        assert_eq!(result.labels().len(), 12);
        assert!(result.labels().iter().all(|&l| l < 10));
        assert!(result.centroids().iter().all(|v| v.is_finite()));
        // Identical vectors always land together
        for i in 0..12 {
            assert_eq!(result.labels()[i], result.labels()[i % 3]);
        }
    }

    #[test]
    fn test_fewer_rows_than_clusters() {
        let data = blobs().slice(ndarray::s![..3, ..]).to_owned();
        let result = fit_kmeans(&data, &KMeansConfig::new(10, 42)).unwrap();
        assert_eq!(result.k(), 3);
    }

    #[test]
    fn test_empty_input() {
        let result = fit_kmeans(&Array2::zeros((0, 4)), &KMeansConfig::default()).unwrap();
        assert!(result.labels().is_empty());
        assert_eq!(result.k(), 0);
    }

    #[test]
    fn test_zero_width_rows_share_one_cluster() {
        let result = fit_kmeans(&Array2::zeros((3, 0)), &KMeansConfig::default()).unwrap();
        assert_eq!(result.labels(), &[0, 0, 0]);
        assert_eq!(result.k(), 3);
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let result = fit_kmeans(&blobs(), &KMeansConfig::new(0, 42));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_inertia_zero_when_every_row_is_a_centroid() {
        let data = array![[0.0, 1.0], [1.0, 0.0]];
        let result = fit_kmeans(&data, &KMeansConfig::new(2, 7)).unwrap();
        assert_eq!(result.inertia(), 0.0);
        assert_ne!(result.labels()[0], result.labels()[1]);
    }

    #[test]
    fn test_assign_clusters_labels_every_row() {
        let genres = [
            vec!["action", "adventure"],
            vec!["action", "adventure"],
            vec!["romance", "drama"],
            vec!["romance", "comedy"],
            vec!["horror"],
        ];
        let movies = genres.iter().enumerate().map(|(i, g)| movie(i, g)).collect();
        let catalog = Catalog::new(movies);
        let vectors = vectorize_genres(&catalog);

        let labeled = assign_clusters(catalog, &vectors, &KMeansConfig::new(3, 42)).unwrap();

        assert_eq!(labeled.clusters().labels().len(), 5);
        assert_eq!(labeled.label(0), labeled.label(1));
        let members: Vec<usize> = labeled.clusters().members(labeled.label(0).unwrap()).collect();
        assert!(members.contains(&0) && members.contains(&1));
    }

    #[test]
    fn test_assign_clusters_rejects_mismatched_table() {
        let vectors = vectorize_genres(&Catalog::default());
        let catalog = Catalog::new(vec![movie(0, &["drama"])]);

        let result = assign_clusters(catalog, &vectors, &KMeansConfig::default());
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}

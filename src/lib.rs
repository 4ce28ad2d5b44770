//! K-means clustering of in-memory feature tables using Lloyd's algorithm.
//!
//! ```
//! use classical_clustering::{KMeans, KMeansConfig};
//!
//! let data = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
//! let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(42)).unwrap();
//! let outcome = kmeans.fit(&data).unwrap();
//! assert_eq!(outcome.labels.len(), 4);
//! assert_eq!(kmeans.centroids().unwrap().len(), 2);
//! ```

pub mod common_types;
pub mod error;
pub mod kmeans;

#[cfg(feature = "python")]
mod python;

pub use common_types::{Dataset, Label};
pub use error::{KMeansError, Result};
pub use kmeans::{
    FitOutcome, KMeans, KMeansConfig, euclidean_distance, squared_euclidean_distance,
};

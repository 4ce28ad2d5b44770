//! K-means clustering with Lloyd's algorithm.

pub mod config;
pub mod distance;
mod lloyd;

pub use config::KMeansConfig;
pub use distance::{euclidean_distance, squared_euclidean_distance};

use crate::common_types::{Label, validate_rows};
use crate::error::{KMeansError, Result};
use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use tracing::{debug, info, warn};

/// Diagnostics of a single `fit` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome<F> {
    /// Number of assign/update rounds that ran.
    pub iterations: usize,
    /// Whether every centroid moved by at most the tolerance in the last round.
    pub converged: bool,
    /// Largest centroid movement observed in the last round.
    pub max_shift: F,
    /// Labels of the training rows against the final centroids.
    pub labels: Vec<Label>,
    /// Number of training rows per cluster, derived from `labels`.
    pub cluster_sizes: Vec<usize>,
    /// Sum of squared distances of the training rows to their centroid.
    pub inertia: F,
}

/// The K-Means clustering engine.
///
/// Holds the hyperparameters and, once fitted, the `k` centroids. Fitting
/// replaces the centroids wholesale; `predict` and the accessors only read them.
#[derive(Debug, Clone)]
pub struct KMeans<F> {
    config: KMeansConfig,
    centroids: Option<Vec<Vec<F>>>,
}

impl<F> KMeans<F>
where
    F: Float + Debug + Send + Sync,
{
    /// Engine with `n_clusters` clusters and an iteration budget, other settings defaulted.
    pub fn new(n_clusters: usize, max_iterations: usize) -> Result<Self> {
        Self::with_config(KMeansConfig::new(n_clusters).with_max_iterations(max_iterations))
    }

    pub fn with_config(config: KMeansConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            centroids: None,
        })
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    pub fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }

    pub fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    /// Feature dimensionality seen during `fit`, `None` before that.
    pub fn n_features(&self) -> Option<usize> {
        self.centroids
            .as_ref()
            .and_then(|c| c.first())
            .map(|c| c.len())
    }

    /// Fits the model, seeding initialization from `config.seed` or OS entropy.
    pub fn fit(&mut self, data: &[Vec<F>]) -> Result<FitOutcome<F>> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_with_rng(data, &mut rng)
    }

    /// Fits the model drawing the initial centroids from `rng`.
    ///
    /// On error the engine keeps whatever centroids it had before the call.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        data: &[Vec<F>],
        rng: &mut R,
    ) -> Result<FitOutcome<F>> {
        let n_features = validate_rows(data)?;
        let n_samples = data.len();
        let k = self.config.n_clusters;
        if k > n_samples {
            warn!(
                n_clusters = k,
                n_samples, "more clusters than samples, initial centroids will repeat"
            );
        }
        debug!(n_samples, n_features, n_clusters = k, "initializing centroids");

        let initial = lloyd::init_centroids(data, k, rng);
        let (centroids, outcome) = self.run_lloyd(data, initial);
        self.centroids = Some(centroids);
        Ok(outcome)
    }

    /// Fits the model and returns the label of every training row.
    pub fn fit_predict(&mut self, data: &[Vec<F>]) -> Result<Vec<Label>> {
        Ok(self.fit(data)?.labels)
    }

    fn run_lloyd(
        &self,
        data: &[Vec<F>],
        mut centroids: Vec<Vec<F>>,
    ) -> (Vec<Vec<F>>, FitOutcome<F>) {
        let parallel = self.config.parallel;
        let tolerance = F::from(self.config.tolerance).unwrap_or_else(F::infinity);
        let mut iterations = 0;
        let mut converged = false;
        let mut max_shift = F::infinity();

        while iterations < self.config.max_iterations {
            iterations += 1;
            let labels = lloyd::assign_labels(data, &centroids, parallel);
            let (next, counts) = lloyd::update_centroids(data, &labels, &centroids, parallel);

            let shifts = lloyd::centroid_shifts(&centroids, &next);
            max_shift = lloyd::max_shift(&shifts);
            converged = lloyd::has_converged(&shifts, tolerance);
            debug!(
                iteration = iterations,
                max_shift = ?max_shift,
                empty_clusters = counts.iter().filter(|&&c| c == 0).count(),
                "lloyd iteration"
            );

            centroids = next;
            if converged {
                break;
            }
        }

        if converged {
            info!(iterations, max_shift = ?max_shift, "k-means converged");
        } else {
            warn!(
                iterations,
                max_shift = ?max_shift,
                "k-means stopped at the iteration limit without converging"
            );
        }

        let labels = lloyd::assign_labels(data, &centroids, parallel);
        let mut cluster_sizes = vec![0; centroids.len()];
        for &label in &labels {
            cluster_sizes[label] += 1;
        }
        let empty = cluster_sizes.iter().filter(|&&c| c == 0).count();
        if empty > 0 {
            warn!(empty_clusters = empty, "some clusters ended up without members");
        }
        let inertia = lloyd::inertia(data, &centroids, &labels);

        let outcome = FitOutcome {
            iterations,
            converged,
            max_shift,
            labels,
            cluster_sizes,
            inertia,
        };
        (centroids, outcome)
    }

    fn fitted_centroids(&self) -> Result<&[Vec<F>]> {
        self.centroids.as_deref().ok_or(KMeansError::NotFitted)
    }

    /// Validates `data` against the fitted model and returns its centroids.
    fn check_input(&self, data: &[Vec<F>]) -> Result<&[Vec<F>]> {
        let centroids = self.fitted_centroids()?;
        let found = validate_rows(data)?;
        let expected = centroids.first().map_or(0, |c| c.len());
        if found != expected {
            return Err(KMeansError::DimensionMismatch { expected, found });
        }
        Ok(centroids)
    }

    /// Labels every row with the index of its nearest centroid, in input order.
    pub fn predict(&self, data: &[Vec<F>]) -> Result<Vec<Label>> {
        let centroids = self.check_input(data)?;
        Ok(lloyd::assign_labels(data, centroids, self.config.parallel))
    }

    pub fn predict_single(&self, point: &[F]) -> Result<Label> {
        let centroids = self.fitted_centroids()?;
        let expected = centroids.first().map_or(0, |c| c.len());
        if point.len() != expected {
            return Err(KMeansError::DimensionMismatch {
                expected,
                found: point.len(),
            });
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(KMeansError::InvalidInput("point contains a non-finite value".into()));
        }
        Ok(lloyd::nearest_centroid(point, centroids).0)
    }

    /// Sum of squared distances from each row to its nearest centroid.
    pub fn inertia(&self, data: &[Vec<F>]) -> Result<F> {
        let centroids = self.check_input(data)?;
        let labels = lloyd::assign_labels(data, centroids, self.config.parallel);
        Ok(lloyd::inertia(data, centroids, &labels))
    }

    /// A copy of the fitted centroids.
    pub fn centroids(&self) -> Result<Vec<Vec<F>>> {
        self.fitted_centroids().map(|c| c.to_vec())
    }
}

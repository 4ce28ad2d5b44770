//! Hyperparameters for a k-means training run.

use crate::error::{KMeansError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configurable knobs for Lloyd's algorithm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KMeansConfig {
    /// Number of clusters (K).
    pub n_clusters: usize,
    /// Upper bound on assign/update rounds.
    pub max_iterations: usize,
    /// Every centroid must move by at most this (L2) distance for the run to count as converged.
    pub tolerance: f64,
    /// Seed for centroid initialization. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Run assignment and update on the rayon thread pool.
    pub parallel: bool,
}

impl KMeansConfig {
    pub const DEFAULT_N_CLUSTERS: usize = 3;
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;
    pub const DEFAULT_TOLERANCE: f64 = 1e-4;

    /// Create a configuration for `n_clusters` clusters, everything else defaulted.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rejects settings under which Lloyd's algorithm is undefined.
    ///
    /// An infinite tolerance is allowed: it stops the run after the first update.
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(KMeansError::InvalidConfiguration(
                "n_clusters must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(KMeansError::InvalidConfiguration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(KMeansError::InvalidConfiguration(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: Self::DEFAULT_N_CLUSTERS,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
            seed: None,
            parallel: true,
        }
    }
}

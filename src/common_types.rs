//! This module contains the data containers consumed by the clustering engine.

use crate::error::{KMeansError, Result};
use num_traits::Float;
use std::ops::Deref;

/// Index of the cluster a sample was assigned to, always in `[0, k)`.
pub type Label = usize;

/// Checks that `rows` form a non-empty rectangular table of finite values.
///
/// Returns the shared row length (the feature dimensionality) on success.
pub(crate) fn validate_rows<F: Float>(rows: &[Vec<F>]) -> Result<usize> {
    let n_features = match rows.first() {
        Some(first) => first.len(),
        None => return Err(KMeansError::InvalidInput("dataset has no rows".into())),
    };
    if n_features == 0 {
        return Err(KMeansError::InvalidInput("rows must have at least one feature".into()));
    }

    for (idx, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(KMeansError::InvalidInput(format!(
                "ragged dataset: row {} has {} features, expected {}",
                idx,
                row.len(),
                n_features
            )));
        }
        if let Some(col) = row.iter().position(|v| !v.is_finite()) {
            return Err(KMeansError::InvalidInput(format!(
                "non-finite value at row {}, column {}",
                idx, col
            )));
        }
    }
    Ok(n_features)
}

/// A rectangular table of feature vectors (rows = samples, columns = features).
///
/// Construction validates the table once, so a `Dataset` is always non-empty,
/// at least one feature wide, and free of NaN or infinite values.
/// It dereferences to `[Vec<F>]` and can be passed wherever the engine expects rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<F> {
    rows: Vec<Vec<F>>,
    n_features: usize,
}

impl<F: Float> Dataset<F> {
    pub fn new(rows: Vec<Vec<F>>) -> Result<Self> {
        let n_features = validate_rows(&rows)?;
        Ok(Dataset { rows, n_features })
    }

    /// Number of samples (N).
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Length of every row (F).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn row(&self, idx: usize) -> Option<&[F]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> &[Vec<F>] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<F>> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Vec<F>> {
        self.rows
    }
}

impl<F: Float> TryFrom<Vec<Vec<F>>> for Dataset<F> {
    type Error = KMeansError;

    fn try_from(rows: Vec<Vec<F>>) -> Result<Self> {
        Dataset::new(rows)
    }
}

impl<F> Deref for Dataset<F> {
    type Target = [Vec<F>];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

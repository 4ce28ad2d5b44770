//! Python bindings, built with the `python` feature.

use crate::error::KMeansError;
use crate::kmeans::{FitOutcome, KMeans, KMeansConfig, euclidean_distance};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

impl From<KMeansError> for PyErr {
    fn from(err: KMeansError) -> Self {
        match err {
            KMeansError::NotFitted => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Calculates the Euclidean distance between two vectors of f64.
#[pyfunction]
#[pyo3(name = "euclidean_distance")]
fn euclidean_distance_py(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
    if a.len() != b.len() {
        return Err(PyValueError::new_err("Input vectors must have the same length."));
    }
    Ok(euclidean_distance(&a, &b))
}

#[pyclass(name = "KMeans")]
struct PyKMeans {
    model: KMeans<f64>,
    last_outcome: Option<FitOutcome<f64>>,
}

#[pymethods]
impl PyKMeans {
    #[new]
    #[pyo3(signature = (n_clusters, max_iterations = 100, tolerance = 1e-4, seed = None))]
    fn new(
        n_clusters: usize,
        max_iterations: usize,
        tolerance: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut config = KMeansConfig::new(n_clusters)
            .with_max_iterations(max_iterations)
            .with_tolerance(tolerance);
        config.seed = seed;
        Ok(PyKMeans {
            model: KMeans::with_config(config)?,
            last_outcome: None,
        })
    }

    /// Expects a list of equally long lists of floats, one per sample.
    fn fit(&mut self, data: Vec<Vec<f64>>) -> PyResult<()> {
        let outcome = self.model.fit(&data)?;
        self.last_outcome = Some(outcome);
        Ok(())
    }

    fn predict(&self, data: Vec<Vec<f64>>) -> PyResult<Vec<usize>> {
        Ok(self.model.predict(&data)?)
    }

    fn fit_predict(&mut self, data: Vec<Vec<f64>>) -> PyResult<Vec<usize>> {
        let outcome = self.model.fit(&data)?;
        let labels = outcome.labels.clone();
        self.last_outcome = Some(outcome);
        Ok(labels)
    }

    fn inertia(&self, data: Vec<Vec<f64>>) -> PyResult<f64> {
        Ok(self.model.inertia(&data)?)
    }

    #[getter]
    fn centroids(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(self.model.centroids()?)
    }

    /// Iterations used by the last fit, `None` before fitting.
    #[getter]
    fn n_iterations(&self) -> Option<usize> {
        self.last_outcome.as_ref().map(|o| o.iterations)
    }

    #[getter]
    fn converged(&self) -> Option<bool> {
        self.last_outcome.as_ref().map(|o| o.converged)
    }
}

/// Module entry point; the name must match `lib.name` in `Cargo.toml`.
#[pymodule]
fn classical_clustering(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(euclidean_distance_py, m)?)?;
    m.add_class::<PyKMeans>()?;
    Ok(())
}

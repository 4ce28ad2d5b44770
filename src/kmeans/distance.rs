//! Euclidean distance helpers.

use num_traits::Float;

/// Sum of squared component differences. Callers guarantee equal lengths.
pub fn squared_euclidean_distance<F: Float>(a: &[F], b: &[F]) -> F {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).fold(F::zero(), |acc, (&x, &y)| {
        let diff = x - y;
        acc + diff * diff
    })
}

/// Unsquared L2 distance, the metric used for assignment and convergence.
pub fn euclidean_distance<F: Float>(a: &[F], b: &[F]) -> F {
    squared_euclidean_distance(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance() {
        let epsilon = 1e-12;
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        // sqrt(9 + 9 + 9)
        assert!((euclidean_distance(&a, &b) - 27.0_f64.sqrt()).abs() < epsilon);
        assert!((squared_euclidean_distance(&a, &b) - 27.0).abs() < epsilon);
        assert_eq!(euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_f32() {
        let d = euclidean_distance(&[0.0f32, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }
}

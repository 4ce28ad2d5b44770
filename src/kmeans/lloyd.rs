//! The individual steps of Lloyd's algorithm.
//!
//! Each step takes the previous centroids by reference and returns fresh
//! vectors, so one iteration never observes a half-updated centroid set.

use super::distance::{euclidean_distance, squared_euclidean_distance};
use crate::common_types::Label;
use num_traits::Float;
use ordered_float::OrderedFloat;
use rand::Rng;
use rayon::prelude::*;

/// Picks `k` rows uniformly at random, with replacement, as starting centroids.
///
/// Duplicates are kept as-is; `data` must be non-empty.
pub(crate) fn init_centroids<F, R>(data: &[Vec<F>], k: usize, rng: &mut R) -> Vec<Vec<F>>
where
    F: Float,
    R: Rng + ?Sized,
{
    let n_samples = data.len();
    (0..k)
        .map(|_| data[rng.gen_range(0..n_samples)].clone())
        .collect()
}

/// Returns the index of the closest centroid and the distance to it.
///
/// `min_by_key` keeps the first of several equal minima, so ties go to the
/// lowest centroid index.
pub(crate) fn nearest_centroid<F: Float>(point: &[F], centroids: &[Vec<F>]) -> (Label, F) {
    centroids
        .iter()
        .enumerate()
        .map(|(idx, centroid)| (idx, euclidean_distance(point, centroid)))
        .min_by_key(|&(_, dist)| distance_key(dist))
        .unwrap_or((0, F::infinity()))
}

// Widening to f64 is exact for f32/f64, so the ordering is preserved.
fn distance_key<F: Float>(dist: F) -> OrderedFloat<f64> {
    OrderedFloat(dist.to_f64().unwrap_or(f64::NAN))
}

/// Assignment step: one label per row, in input order.
pub(crate) fn assign_labels<F>(
    data: &[Vec<F>],
    centroids: &[Vec<F>],
    parallel: bool,
) -> Vec<Label>
where
    F: Float + Send + Sync,
{
    if parallel {
        data.par_iter()
            .map(|point| nearest_centroid(point, centroids).0)
            .collect()
    } else {
        data.iter()
            .map(|point| nearest_centroid(point, centroids).0)
            .collect()
    }
}

fn cast_count<F: Float>(count: usize) -> F {
    // usize -> float rounds, it never fails
    F::from(count).unwrap_or_else(F::infinity)
}

/// Update step: the new centroid of each cluster is the mean of its members.
///
/// A cluster without members keeps its entry from `previous`. Members are
/// summed in input order per cluster, so the result does not depend on the
/// number of threads. Each value is scaled by `1 / count` before it is added,
/// which keeps the sum finite for any finite input. Also returns the member
/// count of every cluster.
pub(crate) fn update_centroids<F>(
    data: &[Vec<F>],
    labels: &[Label],
    previous: &[Vec<F>],
    parallel: bool,
) -> (Vec<Vec<F>>, Vec<usize>)
where
    F: Float + Send + Sync,
{
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); previous.len()];
    for (row_idx, &label) in labels.iter().enumerate() {
        members[label].push(row_idx);
    }

    let mean_of = |(cluster, rows): (usize, &Vec<usize>)| -> Vec<F> {
        if rows.is_empty() {
            return previous[cluster].clone();
        }
        let count: F = cast_count(rows.len());
        let mut mean = vec![F::zero(); previous[cluster].len()];
        for &row_idx in rows {
            for (acc, &value) in mean.iter_mut().zip(data[row_idx].iter()) {
                *acc = *acc + value / count;
            }
        }
        mean
    };

    let centroids = if parallel {
        members.par_iter().enumerate().map(mean_of).collect()
    } else {
        members.iter().enumerate().map(mean_of).collect()
    };
    let counts = members.iter().map(Vec::len).collect();
    (centroids, counts)
}

/// Distance each centroid travelled between two consecutive iterations.
pub(crate) fn centroid_shifts<F: Float>(old: &[Vec<F>], new: &[Vec<F>]) -> Vec<F> {
    old.iter()
        .zip(new.iter())
        .map(|(o, n)| euclidean_distance(o, n))
        .collect()
}

/// Largest entry of `shifts`. A NaN shift is reported as NaN, not skipped.
pub(crate) fn max_shift<F: Float>(shifts: &[F]) -> F {
    shifts.iter().fold(F::zero(), |acc, &shift| {
        if acc.is_nan() || shift.is_nan() {
            F::nan()
        } else {
            acc.max(shift)
        }
    })
}

/// Converged only when every single centroid moved by at most `tolerance`.
pub(crate) fn has_converged<F: Float>(shifts: &[F], tolerance: F) -> bool {
    shifts.iter().all(|&shift| shift <= tolerance)
}

/// Sum of squared distances from each row to its assigned centroid.
pub(crate) fn inertia<F>(data: &[Vec<F>], centroids: &[Vec<F>], labels: &[Label]) -> F
where
    F: Float,
{
    data.iter()
        .zip(labels.iter())
        .fold(F::zero(), |acc, (point, &label)| {
            acc + squared_euclidean_distance(point, &centroids[label])
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn square() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 0.0],
            vec![10.0, 1.0],
        ]
    }

    #[test]
    fn test_init_samples_rows_with_replacement() {
        let data = square();
        let mut rng = StdRng::seed_from_u64(7);
        let centroids = init_centroids(&data, 10, &mut rng);
        assert_eq!(centroids.len(), 10);
        // more centroids than rows forces duplicates; every one is still a copy of a row
        for c in &centroids {
            assert!(data.contains(c), "centroid {:?} is not a dataset row", c);
        }
    }

    #[test]
    fn test_init_with_scripted_rng() {
        let data = square();
        // 0 and 2^63 map to rows 0 and 2 of a four-row table
        let mut rng = StepRng::new(0, 1 << 63);
        let centroids = init_centroids(&data, 2, &mut rng);
        assert_eq!(centroids, vec![vec![0.0, 0.0], vec![10.0, 0.0]]);
    }

    #[test]
    fn test_init_is_reproducible_for_a_seed() {
        let data = square();
        let a = init_centroids(&data, 3, &mut StdRng::seed_from_u64(42));
        let b = init_centroids(&data, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_nearest_centroid_tie_goes_to_lowest_index() {
        let centroids = vec![vec![-1.0, 0.0], vec![1.0, 0.0]];
        let (label, dist) = nearest_centroid(&[0.0, 0.0], &centroids);
        assert_eq!(label, 0);
        assert!((dist - 1.0).abs() < 1e-12);

        // identical centroids: the first one always wins
        let duplicates = vec![vec![5.0], vec![2.0], vec![2.0]];
        assert_eq!(nearest_centroid(&[2.0], &duplicates).0, 1);
    }

    #[test]
    fn test_assign_labels_parallel_matches_sequential() {
        let data: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![(i % 17) as f64, (i % 5) as f64])
            .collect();
        let centroids = vec![vec![0.0, 0.0], vec![8.0, 2.0], vec![16.0, 4.0]];
        let seq = assign_labels(&data, &centroids, false);
        let par = assign_labels(&data, &centroids, true);
        assert_eq!(seq, par);
        assert!(seq.iter().all(|&l| l < 3));
    }

    #[test]
    fn test_update_computes_group_means() {
        let data = square();
        let labels = vec![0, 0, 1, 1];
        let previous = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let (centroids, counts) = update_centroids(&data, &labels, &previous, false);
        assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
        assert_eq!(counts, vec![2, 2]);
    }

    #[test]
    fn test_update_keeps_empty_cluster_in_place() {
        let data = square();
        let labels = vec![0, 0, 0, 0];
        let previous = vec![vec![1.0, 1.0], vec![-3.0, 7.0]];
        let (centroids, counts) = update_centroids(&data, &labels, &previous, true);
        assert_eq!(centroids[0], vec![5.0, 0.5]);
        assert_eq!(centroids[1], vec![-3.0, 7.0]);
        assert_eq!(counts, vec![4, 0]);
        assert!(centroids.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_update_parallel_matches_sequential() {
        let data: Vec<Vec<f64>> = (0..500)
            .map(|i| vec![(i as f64) * 0.1, (i as f64).sin()])
            .collect();
        let labels: Vec<usize> = (0..500).map(|i| i % 4).collect();
        let previous = vec![vec![0.0, 0.0]; 4];
        let seq = update_centroids(&data, &labels, &previous, false);
        let par = update_centroids(&data, &labels, &previous, true);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_update_mean_of_values_near_float_max() {
        let data = vec![vec![1e308, -1e308], vec![1e308, -1e308], vec![f64::MAX, 0.0]];
        let previous = vec![vec![0.0, 0.0]];
        let (centroids, _) = update_centroids(&data, &[0, 0, 0], &previous, false);
        assert!(centroids[0].iter().all(|v| v.is_finite()), "got {:?}", centroids);
        assert!(centroids[0][0] > 1e308 && centroids[0][0] < f64::MAX);
        let expected_y = -(1e308 / 3.0) * 2.0;
        assert!(((centroids[0][1] - expected_y) / expected_y).abs() < 1e-12);

        let pair = vec![vec![1e308], vec![1e308]];
        let (centroids, _) = update_centroids(&pair, &[0, 0], &[vec![0.0]], true);
        assert_eq!(centroids, vec![vec![1e308]]);
    }

    #[test]
    fn test_max_shift_keeps_nan() {
        assert_eq!(max_shift(&[0.5, 2.0, 1.0]), 2.0);
        assert!(max_shift(&[0.5, f64::NAN, 1.0]).is_nan());
        assert!(max_shift(&[f64::NAN, 0.0]).is_nan());
        assert_eq!(max_shift::<f64>(&[]), 0.0);
    }

    #[test]
    fn test_convergence_requires_every_centroid() {
        let old = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let new = vec![vec![0.0, 0.00005], vec![1.0, 1.001]];
        let shifts = centroid_shifts(&old, &new);
        assert!(shifts[0] <= 1e-4);
        assert!(shifts[1] > 1e-4);
        assert!(!has_converged(&shifts, 1e-4));
        assert!(has_converged(&shifts, 1e-2));
        assert!(has_converged(&centroid_shifts(&old, &old), 0.0));
    }

    #[test]
    fn test_inertia() {
        let data = square();
        let centroids = vec![vec![0.0, 0.5], vec![10.0, 0.5]];
        let value = inertia(&data, &centroids, &[0, 0, 1, 1]);
        assert!((value - 1.0).abs() < 1e-12);
    }
}

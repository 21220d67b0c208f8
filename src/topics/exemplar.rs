// Exemplar marking.
//
// The clusterer reports each cluster's most representative vectors; the term
// table wants a per-row flag instead. Matching is by near-equality, not
// identity — enrichment may have round-tripped the vectors through other
// representations, and genuinely duplicated terms should all be starred.
//
// The scan is O(points x exemplars). Term tables here are a few hundred to a
// few thousand rows, where this is immaterial; revisit before pointing it at
// corpora orders of magnitude larger.

use crate::cluster::HdbscanFit;

// Same tolerances numpy's allclose applies.
const RTOL: f64 = 1e-5;
const ATOL: f64 = 1e-8;

fn allclose(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (x - y).abs() <= ATOL + RTOL * y.abs()
        })
}

/// One flag per input point: true when the point matches any cluster's
/// exemplar vectors within floating-point tolerance.
pub fn mark_exemplars(points: &[Vec<f32>], fit: &HdbscanFit) -> Vec<bool> {
    let exemplars: Vec<&Vec<f32>> = fit.exemplars.iter().flatten().collect();
    points
        .iter()
        .map(|p| exemplars.iter().any(|e| allclose(p, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{HdbscanFit, NOISE};

    fn fit_with_exemplars(exemplars: Vec<Vec<Vec<f32>>>) -> HdbscanFit {
        HdbscanFit {
            labels: vec![NOISE],
            exemplars,
        }
    }

    #[test]
    fn marks_near_equal_points() {
        let fit = fit_with_exemplars(vec![vec![vec![1.0, 2.0]]]);
        let points = vec![
            vec![1.0, 2.0],
            vec![1.0, 2.000_001],
            vec![1.5, 2.0],
            vec![1.0, 2.1],
        ];

        assert_eq!(mark_exemplars(&points, &fit), vec![true, true, false, false]);
    }

    #[test]
    fn duplicate_rows_are_all_marked() {
        let fit = fit_with_exemplars(vec![vec![vec![3.0, 3.0]]]);
        let points = vec![vec![3.0, 3.0], vec![3.0, 3.0], vec![0.0, 0.0]];

        assert_eq!(mark_exemplars(&points, &fit), vec![true, true, false]);
    }

    #[test]
    fn matches_across_all_clusters() {
        let fit = fit_with_exemplars(vec![
            vec![vec![0.0, 0.0]],
            vec![vec![5.0, 5.0], vec![6.0, 6.0]],
        ]);
        let points = vec![vec![6.0, 6.0], vec![0.0, 0.0], vec![9.0, 9.0]];

        assert_eq!(mark_exemplars(&points, &fit), vec![true, true, false]);
    }

    #[test]
    fn dimension_mismatch_never_matches() {
        let fit = fit_with_exemplars(vec![vec![vec![1.0, 2.0, 3.0]]]);
        let points = vec![vec![1.0, 2.0]];

        assert_eq!(mark_exemplars(&points, &fit), vec![false]);
    }

    #[test]
    fn marking_is_idempotent() {
        let fit = fit_with_exemplars(vec![vec![vec![1.0, 1.0], vec![2.0, 2.0]]]);
        let points = vec![vec![1.0, 1.0], vec![4.0, 4.0], vec![2.0, 2.0]];

        let first = mark_exemplars(&points, &fit);
        let second = mark_exemplars(&points, &fit);
        assert_eq!(first, second);
    }

    #[test]
    fn no_exemplars_marks_nothing() {
        let fit = fit_with_exemplars(Vec::new());
        let points = vec![vec![1.0], vec![2.0]];

        assert_eq!(mark_exemplars(&points, &fit), vec![false, false]);
    }
}

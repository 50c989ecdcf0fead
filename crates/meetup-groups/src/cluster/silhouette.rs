//! Silhouette coefficient over a labeling.

use crate::cluster::kmeans::squared_distance;
use ndarray::ArrayView2;

/// Per-sample silhouette coefficients.
///
/// Samples whose cluster has a single member score 0. Returns `None` when the
/// labeling has fewer than two clusters or every sample is its own cluster,
/// where the score is undefined.
pub fn silhouette_samples(data: ArrayView2<'_, f64>, labels: &[usize]) -> Option<Vec<f64>> {
    let n = data.nrows();
    if n == 0 || labels.len() != n {
        return None;
    }

    let n_labels = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0usize; n_labels];
    for &label in labels {
        sizes[label] += 1;
    }
    let used = sizes.iter().filter(|&&s| s > 0).count();
    if used < 2 || used >= n {
        return None;
    }

    // Per-row distance sums; no n x n matrix.
    let mut scores = Vec::with_capacity(n);
    let mut per_cluster = vec![0.0f64; n_labels];

    for i in 0..n {
        let own = labels[i];
        if sizes[own] == 1 {
            scores.push(0.0);
            continue;
        }

        per_cluster.iter_mut().for_each(|v| *v = 0.0);
        let row = data.row(i);
        for (j, other) in data.rows().into_iter().enumerate() {
            per_cluster[labels[j]] += squared_distance(row, other).sqrt();
        }

        // Self-distance is zero, so only the divisor needs the exclusion.
        let a = per_cluster[own] / (sizes[own] - 1) as f64;
        let b = (0..n_labels)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| per_cluster[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        scores.push(if denom > 0.0 { (b - a) / denom } else { 0.0 });
    }

    Some(scores)
}

/// Mean silhouette coefficient in `[-1, 1]`, higher is better.
pub fn silhouette_score(data: ArrayView2<'_, f64>, labels: &[usize]) -> Option<f64> {
    let samples = silhouette_samples(data, labels)?;
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_well_separated_scores_high() {
        let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let good = silhouette_score(data.view(), &[0, 0, 1, 1]).unwrap();
        let bad = silhouette_score(data.view(), &[0, 1, 0, 1]).unwrap();
        assert!(good > 0.85, "good labeling scored {good}");
        assert!(bad < 0.0, "bad labeling scored {bad}");
    }

    #[test]
    fn test_known_value() {
        // Points 0, 1 | 4: a(0)=1, b(0)=4 -> 0.75; a(1)=1, b(1)=3 -> 2/3; singleton -> 0.
        let data = array![[0.0], [1.0], [4.0]];
        let samples = silhouette_samples(data.view(), &[0, 0, 1]).unwrap();
        assert!((samples[0] - 0.75).abs() < 1e-12);
        assert!((samples[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(samples[2], 0.0);
        let score = silhouette_score(data.view(), &[0, 0, 1]).unwrap();
        assert!((score - (0.75 + 2.0 / 3.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_matches_brute_force_on_larger_input() {
        let n = 300;
        let data = ndarray::Array2::from_shape_fn((n, 2), |(i, d)| {
            let cluster = (i % 3) as f64 * 5.0;
            cluster + ((i * 7 + d * 13) % 11) as f64 * 0.1
        });
        let labels: Vec<usize> = (0..n).map(|i| i % 3).collect();
        let samples = silhouette_samples(data.view(), &labels).unwrap();

        let dist = |i: usize, j: usize| squared_distance(data.row(i), data.row(j)).sqrt();
        for i in [0, 1, 157, 299] {
            let mean_to = |c: usize| {
                let members: Vec<usize> = (0..n).filter(|&j| labels[j] == c && j != i).collect();
                members.iter().map(|&j| dist(i, j)).sum::<f64>() / members.len() as f64
            };
            let a = mean_to(labels[i]);
            let b = (0..3)
                .filter(|&c| c != labels[i])
                .map(mean_to)
                .fold(f64::INFINITY, f64::min);
            let expected = (b - a) / a.max(b);
            assert!((samples[i] - expected).abs() < 1e-9, "sample {i}");
        }
    }

    #[test]
    fn test_undefined_for_degenerate_labelings() {
        let data = array![[0.0], [1.0], [2.0]];
        assert_eq!(silhouette_score(data.view(), &[0, 0, 0]), None);
        // Unused label ids do not count as clusters.
        assert_eq!(silhouette_score(data.view(), &[2, 2, 2]), None);
        assert_eq!(silhouette_score(data.view(), &[0, 1, 2]), None);
        assert_eq!(silhouette_score(data.view(), &[0, 1]), None);
    }
}

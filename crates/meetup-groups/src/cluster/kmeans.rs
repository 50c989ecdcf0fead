//! Seeded k-means (Lloyd's algorithm with k-means++ seeding).

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Options for one k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOptions {
    pub n_clusters: usize,
    /// Number of seeded restarts; the lowest-inertia run is kept.
    pub n_init: usize,
    pub max_iter: usize,
    /// Stop once inertia changes by less than this between iterations.
    pub tolerance: f64,
    /// Restart `i` seeds its RNG with `seed + i`.
    pub seed: u64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster label per row, in `0..n_clusters`. Some labels may be unused.
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    /// Sum of squared distances from each row to its centroid.
    pub inertia: f64,
    /// Lloyd iterations run by the kept restart.
    pub n_iter: usize,
}

impl KMeansFit {
    /// Number of labels actually used.
    pub fn effective_clusters(&self) -> usize {
        distinct_labels(&self.labels)
    }
}

/// Count distinct labels in a labeling.
pub fn distinct_labels(labels: &[usize]) -> usize {
    let mut seen: Vec<usize> = labels.to_vec();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

pub(crate) fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Fit k-means to `data` (`[n, d]`).
///
/// `n_clusters` is clamped to `1..=n`. Empty input yields an empty fit.
pub fn kmeans(data: ArrayView2<'_, f64>, options: &KMeansOptions) -> KMeansFit {
    let n = data.nrows();
    if n == 0 {
        return KMeansFit {
            labels: Vec::new(),
            centroids: Array2::zeros((0, data.ncols())),
            inertia: 0.0,
            n_iter: 0,
        };
    }
    let k = options.n_clusters.clamp(1, n);

    let mut best: Option<KMeansFit> = None;
    for restart in 0..options.n_init.max(1) {
        let seed = options.seed.wrapping_add(restart as u64);
        let fit = fit_single(data, k, options, seed);
        let better = best.as_ref().map_or(true, |b| fit.inertia < b.inertia);
        if better {
            best = Some(fit);
        }
    }
    // n_init >= 1 guarantees one run.
    best.unwrap_or_else(|| fit_single(data, k, options, options.seed))
}

fn fit_single(data: ArrayView2<'_, f64>, k: usize, options: &KMeansOptions, seed: u64) -> KMeansFit {
    let n = data.nrows();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = kmeans_plusplus_init(data, k, &mut rng);
    let mut labels = vec![usize::MAX; n];
    let mut prev_inertia = f64::INFINITY;
    let mut n_iter = 0;

    for _ in 0..options.max_iter {
        n_iter += 1;
        let (changed, inertia) = assign(data, centroids.view(), &mut labels);
        if !changed {
            break;
        }
        update_centroids(data, &labels, &mut centroids);
        if (prev_inertia - inertia).abs() < options.tolerance {
            break;
        }
        prev_inertia = inertia;
    }

    // Final E-step so labels agree with the returned centroids.
    let (_, inertia) = assign(data, centroids.view(), &mut labels);

    KMeansFit {
        labels,
        centroids,
        inertia,
        n_iter,
    }
}

/// Pick initial centroids with probability proportional to D^2.
fn kmeans_plusplus_init(data: ArrayView2<'_, f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::zeros((k, data.ncols()));
    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    let mut min_dist: Vec<f64> = data
        .rows()
        .into_iter()
        .map(|row| squared_distance(row, data.row(first)))
        .collect();

    for c in 1..k {
        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.gen::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = None;
            let mut last_positive = 0;
            for (i, &d) in min_dist.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                last_positive = i;
                cumsum += d;
                if cumsum >= threshold {
                    selected = Some(i);
                    break;
                }
            }
            selected.unwrap_or(last_positive)
        } else {
            // Every row sits on a chosen centroid.
            rng.gen_range(0..n)
        };

        centroids.row_mut(c).assign(&data.row(next));
        for (i, row) in data.rows().into_iter().enumerate() {
            let d = squared_distance(row, data.row(next));
            if d < min_dist[i] {
                min_dist[i] = d;
            }
        }
    }

    centroids
}

/// Assign each row to its nearest centroid (lowest index wins ties).
/// Returns whether any label changed and the resulting inertia.
fn assign(data: ArrayView2<'_, f64>, centroids: ArrayView2<'_, f64>, labels: &mut [usize]) -> (bool, f64) {
    let mut changed = false;
    let mut inertia = 0.0;

    for (i, row) in data.rows().into_iter().enumerate() {
        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;
        for (c, centroid) in centroids.rows().into_iter().enumerate() {
            let dist = squared_distance(row, centroid);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        if labels[i] != best_cluster {
            labels[i] = best_cluster;
            changed = true;
        }
        inertia += best_dist;
    }

    (changed, inertia)
}

/// Move each centroid to the mean of its rows; empty clusters keep their centroid.
fn update_centroids(data: ArrayView2<'_, f64>, labels: &[usize], centroids: &mut Array2<f64>) {
    let k = centroids.nrows();
    let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
    let mut counts = vec![0usize; k];

    for (row, &label) in data.rows().into_iter().zip(labels) {
        counts[label] += 1;
        let mut sum = sums.row_mut(label);
        sum += &row;
    }

    for c in 0..k {
        if counts[c] > 0 {
            let mean = sums.row(c).mapv(|v| v / counts[c] as f64);
            centroids.row_mut(c).assign(&mean);
        }
    }
}

//! Adaptive cluster-count search.
//!
//! Every k in the candidate range is fitted and scored by silhouette; the
//! best-scoring labeling wins, smallest k on ties. If no candidate yields a
//! scorable (>= 2 cluster) labeling, the `min_k` labeling is used as-is.

use crate::cluster::kmeans::{kmeans, KMeansOptions};
use crate::cluster::silhouette::silhouette_score;
use crate::config::GroupingConfig;
use crate::features::FeatureMatrix;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Inclusive range of cluster counts to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRange {
    pub min_k: usize,
    pub max_k: usize,
}

impl CandidateRange {
    /// `min_k = max(2, ceil(n*min_ratio))`, `max_k = max(min_k, ceil(n*max_ratio))`,
    /// both clipped to `n`.
    pub fn for_users(n: usize, min_ratio: f64, max_ratio: f64) -> Self {
        let min_k = 2.max((n as f64 * min_ratio).ceil() as usize);
        let max_k = min_k.max((n as f64 * max_ratio).ceil() as usize);
        Self {
            min_k: min_k.min(n),
            max_k: max_k.min(n),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.min_k..=self.max_k
    }
}

/// Score recorded for one candidate k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub k: usize,
    /// `None` when the labeling collapsed to a single cluster.
    pub silhouette: Option<f64>,
    pub inertia: f64,
}

/// Outcome of the k search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSelection {
    pub range: CandidateRange,
    pub candidates: Vec<CandidateScore>,
    pub chosen_k: usize,
    pub score: Option<f64>,
    /// True when no candidate was scorable and `min_k` was used regardless.
    pub fell_back: bool,
}

/// Raw clusters plus the search that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Clusters in order of first appearance, members in input order.
    pub clusters: Vec<Vec<UserId>>,
    /// `None` for empty input and the small-input bypass.
    pub selection: Option<ClusterSelection>,
}

/// Search the candidate range and partition the matrix rows.
pub fn select_and_partition(matrix: &FeatureMatrix, config: &GroupingConfig) -> Partition {
    let n = matrix.n_rows();
    let ids = matrix.user_ids();

    if n == 0 {
        return Partition {
            clusters: Vec::new(),
            selection: None,
        };
    }
    if n < config.group_min_size {
        info!(users = n, "too few users to cluster, keeping a single group");
        return Partition {
            clusters: vec![ids.to_vec()],
            selection: None,
        };
    }

    let range = CandidateRange::for_users(n, config.min_cluster_ratio, config.max_cluster_ratio);
    info!(min_k = range.min_k, max_k = range.max_k, "searching cluster count");

    let mut candidates = Vec::new();
    let mut min_k_labels: Option<Vec<usize>> = None;
    let mut best_labels: Option<Vec<usize>> = None;

    for k in range.iter() {
        let fit = kmeans(
            matrix.data().view(),
            &KMeansOptions {
                n_clusters: k,
                n_init: config.n_init,
                max_iter: config.max_iter,
                tolerance: config.tolerance,
                seed: config.seed,
            },
        );
        let score = silhouette_score(matrix.data().view(), &fit.labels);
        match score {
            Some(s) => debug!(k, silhouette = s, inertia = fit.inertia, "scored candidate"),
            None => debug!(k, "candidate collapsed to one cluster, skipping"),
        }
        candidates.push(CandidateScore {
            k,
            silhouette: score,
            inertia: fit.inertia,
        });

        if best_candidate(&candidates).map(|c| c.k) == Some(k) {
            best_labels = Some(fit.labels.clone());
        }
        if min_k_labels.is_none() {
            min_k_labels = Some(fit.labels);
        }
    }

    let (chosen_k, score, labels, fell_back) = match (best_candidate(&candidates), best_labels) {
        (Some(best), Some(labels)) => (best.k, best.silhouette, labels, false),
        _ => {
            warn!(
                k = range.min_k,
                "no candidate produced two or more clusters, using min_k labeling"
            );
            (range.min_k, None, min_k_labels.unwrap_or_else(|| vec![0; n]), true)
        }
    };
    info!(k = chosen_k, silhouette = ?score, "selected cluster count");

    Partition {
        clusters: group_by_label(ids, &labels),
        selection: Some(ClusterSelection {
            range,
            candidates,
            chosen_k,
            score,
            fell_back,
        }),
    }
}

/// Highest-silhouette candidate, earliest (smallest k) on ties. `None` when
/// no candidate has a defined score.
pub fn best_candidate(candidates: &[CandidateScore]) -> Option<&CandidateScore> {
    let mut best: Option<(&CandidateScore, f64)> = None;
    for candidate in candidates {
        let Some(score) = candidate.silhouette else {
            continue;
        };
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Collect ids per label, clusters ordered by first appearance.
pub fn group_by_label(ids: &[UserId], labels: &[usize]) -> Vec<Vec<UserId>> {
    let mut slot_of_label: Vec<Option<usize>> = Vec::new();
    let mut clusters: Vec<Vec<UserId>> = Vec::new();

    for (&id, &label) in ids.iter().zip(labels) {
        if label >= slot_of_label.len() {
            slot_of_label.resize(label + 1, None);
        }
        let slot = *slot_of_label[label].get_or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[slot].push(id);
    }

    clusters
}

//! Cluster-count selection and partitioning.

pub mod kmeans;
pub mod selector;
pub mod silhouette;

pub use kmeans::{kmeans, KMeansFit, KMeansOptions};
pub use selector::{
    best_candidate, group_by_label, select_and_partition, CandidateRange, CandidateScore,
    ClusterSelection, Partition,
};
pub use silhouette::{silhouette_samples, silhouette_score};

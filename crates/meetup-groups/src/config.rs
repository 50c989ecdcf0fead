//! Engine configuration.

use crate::error::{GroupingError, Result};
use serde::{Deserialize, Serialize};

/// Default multiplier applied to latitude/longitude dimensions.
pub const DEFAULT_GEO_WEIGHT: f64 = 3.0;
/// Default lower bound of the candidate-k search, as a fraction of user count.
pub const DEFAULT_MIN_CLUSTER_RATIO: f64 = 0.14;
/// Default upper bound of the candidate-k search, as a fraction of user count.
pub const DEFAULT_MAX_CLUSTER_RATIO: f64 = 0.35;
/// Default smallest allowed group.
pub const DEFAULT_GROUP_MIN_SIZE: usize = 3;
/// Default largest allowed group.
pub const DEFAULT_GROUP_MAX_SIZE: usize = 8;
/// Default partitioner seed.
pub const DEFAULT_SEED: u64 = 42;

/// Options recognised by [`crate::GroupingEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Scales geo dimensions relative to trait dimensions.
    pub geo_weight: f64,
    pub min_cluster_ratio: f64,
    pub max_cluster_ratio: f64,
    pub group_min_size: usize,
    pub group_max_size: usize,
    /// Base seed for k-means++ seeding; restart `i` uses `seed + i`.
    pub seed: u64,
    /// Number of k-means restarts per candidate k (best inertia kept).
    pub n_init: usize,
    /// Maximum Lloyd iterations per restart.
    pub max_iter: usize,
    /// Convergence threshold on inertia change.
    pub tolerance: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            geo_weight: DEFAULT_GEO_WEIGHT,
            min_cluster_ratio: DEFAULT_MIN_CLUSTER_RATIO,
            max_cluster_ratio: DEFAULT_MAX_CLUSTER_RATIO,
            group_min_size: DEFAULT_GROUP_MIN_SIZE,
            group_max_size: DEFAULT_GROUP_MAX_SIZE,
            seed: DEFAULT_SEED,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

impl GroupingConfig {
    pub fn with_geo_weight(mut self, geo_weight: f64) -> Self {
        self.geo_weight = geo_weight;
        self
    }

    pub fn with_group_sizes(mut self, min: usize, max: usize) -> Self {
        self.group_min_size = min;
        self.group_max_size = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Group size bounds as a [`GroupBounds`] pair.
    pub fn bounds(&self) -> GroupBounds {
        GroupBounds {
            min: self.group_min_size,
            max: self.group_max_size,
        }
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<()> {
        if !self.geo_weight.is_finite() || self.geo_weight < 0.0 {
            return Err(GroupingError::config(
                "geo_weight",
                format!("must be a finite value >= 0, got {}", self.geo_weight),
            ));
        }
        for (field, ratio) in [
            ("min_cluster_ratio", self.min_cluster_ratio),
            ("max_cluster_ratio", self.max_cluster_ratio),
        ] {
            if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
                return Err(GroupingError::config(
                    field,
                    format!("must be in (0, 1], got {ratio}"),
                ));
            }
        }
        if self.min_cluster_ratio > self.max_cluster_ratio {
            return Err(GroupingError::config(
                "min_cluster_ratio",
                format!(
                    "must not exceed max_cluster_ratio ({} > {})",
                    self.min_cluster_ratio, self.max_cluster_ratio
                ),
            ));
        }
        if self.group_min_size == 0 {
            return Err(GroupingError::config("group_min_size", "must be >= 1"));
        }
        if self.group_min_size > self.group_max_size {
            return Err(GroupingError::config(
                "group_min_size",
                format!(
                    "must not exceed group_max_size ({} > {})",
                    self.group_min_size, self.group_max_size
                ),
            ));
        }
        // Below this the size planner cannot split every total >= min.
        let required_max = self.group_min_size.checked_mul(2).map(|twice| twice - 1);
        match required_max {
            Some(required) if self.group_max_size >= required => {}
            Some(required) => {
                return Err(GroupingError::config(
                    "group_max_size",
                    format!("must be >= {required}, got {}", self.group_max_size),
                ));
            }
            None => {
                return Err(GroupingError::config(
                    "group_min_size",
                    format!("too large: {}", self.group_min_size),
                ));
            }
        }
        if self.n_init == 0 {
            return Err(GroupingError::config("n_init", "must be >= 1"));
        }
        if self.max_iter == 0 {
            return Err(GroupingError::config("max_iter", "must be >= 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(GroupingError::config(
                "tolerance",
                format!("must be a finite value >= 0, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

/// Inclusive size range every output group must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBounds {
    pub min: usize,
    pub max: usize,
}

impl GroupBounds {
    pub fn contains(&self, size: usize) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

impl Default for GroupBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_GROUP_MIN_SIZE,
            max: DEFAULT_GROUP_MAX_SIZE,
        }
    }
}

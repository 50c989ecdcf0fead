//! meetup-groups - form small in-person meetup groups from interest profiles.
//!
//! Given per-user trait weights and coordinates, the engine picks a cluster
//! count adaptively, partitions users with seeded k-means, then repairs the
//! partition so every group holds between `group_min_size` and
//! `group_max_size` members (3 and 8 by default).
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌──────────────┐   ┌──────────┐   ┌───────────┐
//! │   input    │──▶│  features  │──▶│   cluster    │──▶│  repair  │──▶│  summary  │
//! │ (adapter)  │   │ vocab+rows │   │ k search +   │   │ bin-pack │   │ top traits│
//! └────────────┘   └────────────┘   │ silhouette   │   └──────────┘   │ centroid  │
//!                                   └──────────────┘                  └───────────┘
//! ```
//!
//! The pipeline is synchronous and pure: identical input and seed produce
//! identical groups.
//!
//! # Example
//!
//! ```
//! use meetup_groups::{GroupingConfig, GroupingEngine, UserRecord};
//!
//! let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
//! let users: Vec<_> = (0..12)
//!     .map(|i| UserRecord::new(i).with_trait(if i % 2 == 0 { "chess" } else { "jazz" }, 1.0))
//!     .collect();
//! let outcome = engine.run(&users).unwrap();
//! assert!(outcome.groups.iter().all(|g| (3..=8).contains(&g.users.len())));
//! ```

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod input;
pub mod repair;
pub mod summary;
pub mod types;

pub use cluster::{CandidateRange, CandidateScore, ClusterSelection, Partition};
pub use config::{GroupBounds, GroupingConfig};
pub use engine::{GroupingEngine, GroupingOutcome, RunContext, RunReport};
pub use error::{GroupingError, Result};
pub use features::{FeatureMatrix, TraitVocabulary};
pub use repair::{plan_sizes, RepairReport};
pub use summary::summarize_groups;
pub use types::{GroupRecord, UserId, UserRecord};

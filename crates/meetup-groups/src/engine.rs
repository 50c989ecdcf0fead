//! End-to-end grouping pipeline.
//!
//! ```text
//! UserRecords -> TraitVocabulary -> FeatureMatrix -> select_and_partition
//!             -> repair_clusters -> summarize_groups -> GroupRecords
//! ```
//!
//! Every intermediate lives in a [`RunContext`] scoped to one call of
//! [`GroupingEngine::run`]; the engine itself only holds configuration.

use crate::cluster::{select_and_partition, ClusterSelection};
use crate::config::GroupingConfig;
use crate::error::{GroupingError, Result};
use crate::features::{FeatureMatrix, TraitVocabulary};
use crate::input::parse_document;
use crate::repair::{repair_clusters, RepairReport};
use crate::summary::summarize_groups;
use crate::types::{GroupRecord, UserRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Per-run state built from the input records.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub vocabulary: TraitVocabulary,
    pub matrix: FeatureMatrix,
}

impl RunContext {
    pub fn build(users: &[UserRecord], config: &GroupingConfig) -> Self {
        let vocabulary = TraitVocabulary::build(users);
        let matrix = FeatureMatrix::build(users, &vocabulary, config.geo_weight);
        info!(
            traits = vocabulary.len(),
            rows = matrix.n_rows(),
            cols = matrix.n_cols(),
            "built feature matrix"
        );
        Self { vocabulary, matrix }
    }
}

/// Diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub users: usize,
    pub vocabulary_size: usize,
    /// True when the input was too small to cluster and became one group.
    pub bypass: bool,
    pub selection: Option<ClusterSelection>,
    pub repair: Option<RepairReport>,
}

/// Exported groups plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingOutcome {
    pub groups: Vec<GroupRecord>,
    pub report: RunReport,
}

/// Stateless grouping engine; safe to reuse across runs.
#[derive(Debug, Clone)]
pub struct GroupingEngine {
    config: GroupingConfig,
}

impl GroupingEngine {
    /// Create an engine, rejecting invalid configuration up front.
    pub fn new(config: GroupingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Normalize a raw JSON array of user records and group them.
    pub fn run_json(&self, doc: &serde_json::Value) -> Result<GroupingOutcome> {
        let users = parse_document(doc)?;
        self.run(&users)
    }

    /// Group `users`. Every id lands in exactly one output group.
    pub fn run(&self, users: &[UserRecord]) -> Result<GroupingOutcome> {
        check_users(users)?;

        let mut report = RunReport {
            users: users.len(),
            ..Default::default()
        };
        if users.is_empty() {
            return Ok(GroupingOutcome {
                groups: Vec::new(),
                report,
            });
        }

        let ctx = RunContext::build(users, &self.config);
        report.vocabulary_size = ctx.vocabulary.len();

        let partition = select_and_partition(&ctx.matrix, &self.config);
        report.selection = partition.selection;

        let groups = if users.len() < self.config.group_min_size {
            report.bypass = true;
            partition.clusters
        } else {
            let repaired = repair_clusters(partition.clusters, self.config.bounds());
            report.repair = Some(repaired.report);
            repaired.groups
        };

        let records = summarize_groups(&groups, users);
        info!(groups = records.len(), users = users.len(), "formed groups");

        Ok(GroupingOutcome {
            groups: records,
            report,
        })
    }
}

fn check_users(users: &[UserRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(users.len());
    for user in users {
        user.validate()?;
        if !seen.insert(user.id) {
            return Err(GroupingError::DuplicateUserId(user.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_invalid_config() {
        let config = GroupingConfig::default().with_group_sizes(4, 5);
        assert!(GroupingEngine::new(config).is_err());
    }

    #[test]
    fn test_duplicate_ids_fail_fast() {
        let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
        let users = vec![UserRecord::new(1), UserRecord::new(2), UserRecord::new(1)];
        assert_eq!(
            engine.run(&users).unwrap_err(),
            GroupingError::DuplicateUserId(1)
        );
    }

    #[test]
    fn test_bypass_report() {
        let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
        let outcome = engine
            .run(&[UserRecord::new(5).with_trait("chess", 1.0), UserRecord::new(6)])
            .unwrap();
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].users, vec![5, 6]);
        assert_eq!(outcome.groups[0].top_traits, vec!["chess"]);
        assert!(outcome.report.bypass);
        assert!(outcome.report.repair.is_none());
    }

    #[test]
    fn test_run_json_end_to_end() {
        let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
        let doc = json!([
            {"userId": 1, "traits": {"chess": 0.9}, "latitude": 50.0, "longitude": 20.0},
            {"userId": 2, "topTraits": ["chess"], "latitude": 50.1, "longitude": 20.1},
            {"userId": 3, "topTraits": {"chess": 0.8}},
            {"userId": 4, "traits": {"surfing": 1.0}, "latitude": 50.0, "longitude": 20.0}
        ]);
        let outcome = engine.run_json(&doc).unwrap();
        let total: usize = outcome.groups.iter().map(GroupRecord::len).sum();
        assert_eq!(total, 4);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.report.vocabulary_size, 2);
        assert_eq!(outcome.groups[0].group_id, 1);
    }

    #[test]
    fn test_run_json_propagates_contract_violations() {
        let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
        let doc = json!([{"userId": 1, "traits": {"chess": true}}]);
        assert!(matches!(
            engine.run_json(&doc),
            Err(GroupingError::NonNumericWeight { user_id: 1, .. })
        ));
    }
}

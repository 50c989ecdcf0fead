//! Force raw clusters into groups whose size lies in `[min, max]`.
//!
//! Steps, in order:
//!
//! 1. clusters below `min` go to a pool, in-range clusters are accepted, and
//!    oversized clusters are sliced by the size planner;
//! 2. pooled members top up groups with spare capacity, in formation order;
//! 3. leftover pool members form new groups via the size planner;
//! 4. if any group is still out of range, cluster structure is dropped and
//!    the flattened member list is re-chunked from scratch.
//!
//! Step 4 always yields valid groups when the total is at least `min` and the
//! bounds satisfy `max >= 2*min - 1`.

use crate::config::GroupBounds;
use crate::repair::planner::chunk_by_plan;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Counters describing what the repair did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub clusters_in: usize,
    pub accepted: usize,
    pub split: usize,
    pub pooled_users: usize,
    pub topped_up_users: usize,
    pub groups_from_pool: usize,
    pub global_rechunk: bool,
}

/// Repaired groups plus what it took to get them.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub groups: Vec<Vec<UserId>>,
    pub report: RepairReport,
}

/// Run the full repair over clusters in discovery order.
pub fn repair_clusters(clusters: Vec<Vec<UserId>>, bounds: GroupBounds) -> Repaired {
    let mut report = RepairReport {
        clusters_in: clusters.len(),
        ..Default::default()
    };
    let mut groups: Vec<Vec<UserId>> = Vec::new();
    let mut pool: Vec<UserId> = Vec::new();

    for members in clusters {
        let n = members.len();
        if n < bounds.min {
            pool.extend(members);
        } else if n <= bounds.max {
            report.accepted += 1;
            groups.push(members);
        } else {
            report.split += 1;
            groups.extend(chunk_by_plan(&members, bounds));
        }
    }
    report.pooled_users = pool.len();

    if !pool.is_empty() {
        debug!(pooled = pool.len(), "redistributing members of small clusters");
        let consumed = top_up(&mut groups, &pool, bounds.max);
        report.topped_up_users = consumed;

        let remaining = &pool[consumed..];
        if !remaining.is_empty() {
            let fresh = chunk_by_plan(remaining, bounds);
            report.groups_from_pool = fresh.len();
            groups.extend(fresh);
        }
    }

    if groups.iter().any(|g| !bounds.contains(g.len())) {
        warn!("groups outside size bounds after repair, re-chunking all users");
        report.global_rechunk = true;
        let everyone: Vec<UserId> = groups.into_iter().flatten().collect();
        groups = chunk_by_plan(&everyone, bounds);
    }

    Repaired { groups, report }
}

/// Fill groups below `max` from the front of `pool`. Returns members consumed.
fn top_up(groups: &mut [Vec<UserId>], pool: &[UserId], max: usize) -> usize {
    let mut next = 0;
    for group in groups.iter_mut() {
        if next >= pool.len() {
            break;
        }
        let room = max.saturating_sub(group.len());
        let take = room.min(pool.len() - next);
        group.extend_from_slice(&pool[next..next + take]);
        next += take;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: GroupBounds = GroupBounds { min: 3, max: 8 };

    fn ids(range: std::ops::Range<i64>) -> Vec<UserId> {
        range.collect()
    }

    fn sizes(groups: &[Vec<UserId>]) -> Vec<usize> {
        groups.iter().map(Vec::len).collect()
    }

    fn assert_partition(groups: &[Vec<UserId>], expected_total: i64) {
        let mut all: Vec<UserId> = groups.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, ids(0..expected_total));
    }

    #[test]
    fn test_in_range_clusters_pass_through() {
        let repaired = repair_clusters(vec![ids(0..3), ids(3..11)], B);
        assert_eq!(repaired.groups, vec![ids(0..3), ids(3..11)]);
        assert_eq!(repaired.report.accepted, 2);
        assert!(!repaired.report.global_rechunk);
    }

    #[test]
    fn test_oversized_cluster_is_split_in_order() {
        let repaired = repair_clusters(vec![ids(0..17)], B);
        assert_eq!(repaired.groups, vec![ids(0..8), ids(8..14), ids(14..17)]);
        assert_eq!(repaired.report.split, 1);
    }

    #[test]
    fn test_pool_tops_up_in_formation_order() {
        // [7, 4] accepted, then singletons 11 and 12 pooled.
        let clusters = vec![ids(0..7), vec![11], ids(7..11), vec![12]];
        let repaired = repair_clusters(clusters, B);
        assert_eq!(repaired.groups[0], vec![0, 1, 2, 3, 4, 5, 6, 11]);
        assert_eq!(repaired.groups[1], vec![7, 8, 9, 10, 12]);
        assert_eq!(repaired.report.topped_up_users, 2);
        assert_eq!(repaired.report.groups_from_pool, 0);
    }

    #[test]
    fn test_leftover_pool_forms_new_groups() {
        let clusters = vec![ids(0..8), ids(8..10), ids(10..12), ids(12..14)];
        let repaired = repair_clusters(clusters, B);
        assert_eq!(repaired.groups, vec![ids(0..8), ids(8..14)]);
        assert_eq!(repaired.report.pooled_users, 6);
        assert_eq!(repaired.report.groups_from_pool, 1);
        assert!(!repaired.report.global_rechunk);
    }

    #[test]
    fn test_mixed_sizes_from_22_users() {
        // Raw cluster sizes [9, 7, 4, 1, 1].
        let clusters = vec![ids(0..9), ids(9..16), ids(16..20), vec![20], vec![21]];
        let repaired = repair_clusters(clusters, B);
        assert!(repaired.groups.iter().all(|g| B.contains(g.len())));
        assert_eq!(sizes(&repaired.groups).iter().sum::<usize>(), 22);
        assert_partition(&repaired.groups, 22);
        // 9 -> [6, 3]; pool [20, 21] tops up the 6-group.
        assert_eq!(sizes(&repaired.groups), vec![8, 3, 7, 4]);
        assert!(!repaired.report.global_rechunk);
    }

    #[test]
    fn test_short_leftover_triggers_global_rechunk() {
        // All groups full, two stragglers cannot form a valid group.
        let clusters = vec![ids(0..8), vec![8], vec![9]];
        let repaired = repair_clusters(clusters, B);
        assert!(repaired.report.global_rechunk);
        assert_eq!(sizes(&repaired.groups), vec![7, 3]);
        assert_eq!(repaired.groups[0], ids(0..7));
        assert_eq!(repaired.groups[1], ids(7..10));
    }

    #[test]
    fn test_all_singletons() {
        let clusters: Vec<Vec<UserId>> = (0..5).map(|i| vec![i]).collect();
        let repaired = repair_clusters(clusters, B);
        assert_eq!(repaired.groups, vec![ids(0..5)]);
        assert_eq!(repaired.report.pooled_users, 5);
    }

    #[test]
    fn test_empty_input() {
        let repaired = repair_clusters(Vec::new(), B);
        assert!(repaired.groups.is_empty());
        assert_eq!(repaired.report, RepairReport::default());
    }
}

//! Derive representative traits and a centroid for each final group.

use crate::types::{GroupRecord, UserId, UserRecord};
use std::collections::{BTreeMap, HashMap};

/// How many representative traits a group exports.
pub const TOP_TRAITS: usize = 3;

/// Summarize groups in finalization order; ids are assigned 1, 2, 3, ...
pub fn summarize_groups(groups: &[Vec<UserId>], users: &[UserRecord]) -> Vec<GroupRecord> {
    let by_id: HashMap<UserId, &UserRecord> = users.iter().map(|u| (u.id, u)).collect();

    groups
        .iter()
        .enumerate()
        .map(|(i, members)| summarize_group(i as u64 + 1, members, &by_id))
        .collect()
}

fn summarize_group(
    group_id: u64,
    members: &[UserId],
    by_id: &HashMap<UserId, &UserRecord>,
) -> GroupRecord {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut located = 0usize;

    for user in members.iter().filter_map(|id| by_id.get(id)) {
        for (name, &weight) in &user.traits {
            *sums.entry(name.as_str()).or_default() += weight;
        }
        if let Some((lat, lon)) = user.coordinates() {
            lat_sum += lat;
            lon_sum += lon;
            located += 1;
        }
    }

    let (latitude, longitude) = if located > 0 {
        (
            Some(lat_sum / located as f64),
            Some(lon_sum / located as f64),
        )
    } else {
        (None, None)
    };

    GroupRecord {
        group_id,
        users: members.to_vec(),
        top_traits: top_traits(sums),
        latitude,
        longitude,
    }
}

/// Highest summed weight first; equal sums by name ascending.
fn top_traits(sums: BTreeMap<&str, f64>) -> Vec<String> {
    let mut ranked: Vec<(&str, f64)> = sums.into_iter().collect();
    // BTreeMap order is already name-ascending and sort_by is stable.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(TOP_TRAITS)
        .map(|(name, _)| name.to_string())
        .collect()
}

//! Split a headcount into chunk sizes within `[min, max]`.

use crate::config::GroupBounds;

/// Plan chunk sizes summing to `total`.
///
/// Greedy: take the remainder whole once it fits, otherwise the largest size
/// that leaves either nothing or at least `bounds.min` behind. When no size
/// qualifies (only possible for `total < bounds.min`, or bounds with
/// `max < 2*min - 1`) the remainder becomes one out-of-range chunk; callers
/// validate.
pub fn plan_sizes(total: usize, bounds: GroupBounds) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut remaining = total;

    while remaining > 0 {
        if bounds.contains(remaining) {
            sizes.push(remaining);
            break;
        }

        let chosen = (bounds.min..=bounds.max).rev().find(|&size| {
            size <= remaining && {
                let rest = remaining - size;
                rest == 0 || rest >= bounds.min
            }
        });

        match chosen {
            Some(size) => {
                sizes.push(size);
                remaining -= size;
            }
            None => {
                sizes.push(remaining);
                break;
            }
        }
    }

    sizes
}

/// Slice `members` sequentially into chunks sized by [`plan_sizes`].
pub fn chunk_by_plan<T: Clone>(members: &[T], bounds: GroupBounds) -> Vec<Vec<T>> {
    let mut start = 0;
    plan_sizes(members.len(), bounds)
        .into_iter()
        .map(|size| {
            let chunk = members[start..start + size].to_vec();
            start += size;
            chunk
        })
        .collect()
}

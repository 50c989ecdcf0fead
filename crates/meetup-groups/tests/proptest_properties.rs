use meetup_groups::repair::repair_clusters;
use meetup_groups::{plan_sizes, GroupBounds, GroupingConfig, GroupingEngine, UserId, UserRecord};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn user_strategy() -> impl Strategy<Value = (Vec<(usize, f64)>, Option<(f64, f64)>)> {
    (
        prop::collection::vec((0usize..6, 0.0f64..=1.0), 0..4),
        prop::option::of((-60.0f64..60.0, -150.0f64..150.0)),
    )
}

fn build_users(raw: Vec<(Vec<(usize, f64)>, Option<(f64, f64)>)>) -> Vec<UserRecord> {
    const NAMES: [&str; 6] = ["art", "books", "chess", "dance", "food", "golf"];
    raw.into_iter()
        .enumerate()
        .map(|(i, (traits, loc))| {
            let mut user = UserRecord::new(i as i64 * 3 + 1);
            for (t, w) in traits {
                user = user.with_trait(NAMES[t], w);
            }
            if let Some((lat, lon)) = loc {
                user = user.with_location(lat, lon);
            }
            user
        })
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn size_planner_law(total in 3usize..500) {
        let sizes = plan_sizes(total, GroupBounds::default());
        prop_assert_eq!(sizes.iter().sum::<usize>(), total);
        prop_assert!(sizes.iter().all(|s| (3..=8).contains(s)), "{:?}", sizes);
    }

    #[test]
    fn size_planner_law_for_valid_custom_bounds(min in 1usize..6, extra in 0usize..6, total in 1usize..200) {
        let bounds = GroupBounds { min, max: 2 * min - 1 + extra };
        prop_assume!(total >= min);
        let sizes = plan_sizes(total, bounds);
        prop_assert_eq!(sizes.iter().sum::<usize>(), total);
        prop_assert!(sizes.iter().all(|&s| bounds.contains(s)), "{:?}", sizes);
    }

    #[test]
    fn repair_always_yields_valid_partition(cluster_sizes in prop::collection::vec(1usize..20, 1..12)) {
        let mut next: UserId = 0;
        let clusters: Vec<Vec<UserId>> = cluster_sizes
            .iter()
            .map(|&n| {
                let c: Vec<UserId> = (next..next + n as UserId).collect();
                next += n as UserId;
                c
            })
            .collect();
        prop_assume!(next >= 3);

        let repaired = repair_clusters(clusters, GroupBounds::default());
        let mut all: Vec<UserId> = repaired.groups.iter().flatten().copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..next).collect::<Vec<_>>());
        prop_assert!(repaired.groups.iter().all(|g| (3..=8).contains(&g.len())));
    }
}

proptest! {
    #![proptest_config(Config::with_cases(48))]
    #[test]
    fn engine_partitions_and_bounds(raw in prop::collection::vec(user_strategy(), 0..40)) {
        let users = build_users(raw);
        let engine = GroupingEngine::new(GroupingConfig::default()).unwrap();
        let outcome = engine.run(&users).unwrap();

        let mut got: Vec<UserId> = outcome.groups.iter().flat_map(|g| g.users.clone()).collect();
        got.sort_unstable();
        let mut expected: Vec<UserId> = users.iter().map(|u| u.id).collect();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);

        match users.len() {
            0 => prop_assert!(outcome.groups.is_empty()),
            1 | 2 => prop_assert_eq!(outcome.groups.len(), 1),
            _ => prop_assert!(outcome.groups.iter().all(|g| (3..=8).contains(&g.users.len()))),
        }
    }
}

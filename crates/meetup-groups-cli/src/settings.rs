//! Layered settings: defaults, then a JSON file, then `MEETUP_*` environment
//! variables. Command-line flags are applied last by each command.

use anyhow::{Context, Result};
use meetup_groups::GroupingConfig;
use std::path::Path;
use std::str::FromStr;

/// Default export path.
pub const DEFAULT_OUTPUT_FILE: &str = "users_knn_groups.json";
/// Path of the features endpoint on the backing store.
pub const FEATURES_PATH: &str = "/api/users/features";
/// Destination the backend's group handler listens on.
pub const SEND_DESTINATION: &str = "/app/groups";
/// Topic the backend broadcasts groups to.
pub const GROUPS_TOPIC: &str = "/topic/groups";

pub const ENV_BACKEND_URL: &str = "MEETUP_BACKEND_URL";
pub const ENV_WS_URI: &str = "MEETUP_WS_URI";

/// Load engine configuration from an optional file plus the environment.
pub fn load_grouping_config(path: Option<&Path>) -> Result<GroupingConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file: {}", path.display()))?
        }
        None => GroupingConfig::default(),
    };
    apply_env(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Apply `MEETUP_*` overrides read through `lookup`.
pub fn apply_env<F>(config: &mut GroupingConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_var(&lookup, "MEETUP_GEO_WEIGHT")? {
        config.geo_weight = v;
    }
    if let Some(v) = parse_var(&lookup, "MEETUP_MIN_CLUSTER_RATIO")? {
        config.min_cluster_ratio = v;
    }
    if let Some(v) = parse_var(&lookup, "MEETUP_MAX_CLUSTER_RATIO")? {
        config.max_cluster_ratio = v;
    }
    if let Some(v) = parse_var(&lookup, "MEETUP_GROUP_MIN_SIZE")? {
        config.group_min_size = v;
    }
    if let Some(v) = parse_var(&lookup, "MEETUP_GROUP_MAX_SIZE")? {
        config.group_max_size = v;
    }
    if let Some(v) = parse_var(&lookup, "MEETUP_SEED")? {
        config.seed = v;
    }
    Ok(())
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        _ => Ok(None),
    }
}

/// First non-empty value of a flag or an environment variable.
pub fn flag_or_env(flag: Option<String>, env: &str) -> Option<String> {
    flag.or_else(|| std::env::var(env).ok())
        .filter(|s| !s.trim().is_empty())
}

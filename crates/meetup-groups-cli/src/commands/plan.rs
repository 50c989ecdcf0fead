//! `meetup-groups plan <TOTAL>`: show how the size planner splits a total.

use crate::output::{self, Styled};
use anyhow::Result;
use clap::Args;
use meetup_groups::{plan_sizes, GroupingConfig};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Number of users to split
    pub total: usize,

    /// Smallest allowed group
    #[arg(long, default_value_t = meetup_groups::config::DEFAULT_GROUP_MIN_SIZE)]
    pub min_size: usize,

    /// Largest allowed group
    #[arg(long, default_value_t = meetup_groups::config::DEFAULT_GROUP_MAX_SIZE)]
    pub max_size: usize,

    /// Print the sizes as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Validated size plan for `args`.
pub fn plan(args: &PlanArgs) -> Result<Vec<usize>> {
    let config = GroupingConfig::default().with_group_sizes(args.min_size, args.max_size);
    config.validate()?;
    Ok(plan_sizes(args.total, config.bounds()))
}

pub fn run(args: PlanArgs) -> Result<()> {
    let sizes = plan(&args)?;
    if args.json {
        output::print_json(&sizes);
        return Ok(());
    }

    let s = Styled::new();
    let joined = sizes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" + ");
    let in_bounds = sizes
        .iter()
        .all(|&size| (args.min_size..=args.max_size).contains(&size));
    let sym = if in_bounds { s.ok_sym() } else { s.warn_sym() };
    println!(
        "{sym} {} = {}  {}",
        args.total,
        if joined.is_empty() { "0".to_string() } else { joined },
        s.dim(&format!("({} groups, {}..={})", sizes.len(), args.min_size, args.max_size))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(total: usize, min_size: usize, max_size: usize) -> PlanArgs {
        PlanArgs {
            total,
            min_size,
            max_size,
            json: false,
        }
    }

    #[test]
    fn test_plan_defaults() {
        assert_eq!(plan(&args(9, 3, 8)).unwrap(), vec![6, 3]);
        assert_eq!(plan(&args(17, 3, 8)).unwrap(), vec![8, 6, 3]);
    }

    #[test]
    fn test_plan_rejects_bad_bounds() {
        assert!(plan(&args(10, 4, 6)).is_err());
        assert!(plan(&args(10, 0, 6)).is_err());
    }
}

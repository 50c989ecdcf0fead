//! Size-bounded group repair.

pub mod binpack;
pub mod planner;

pub use binpack::{repair_clusters, RepairReport, Repaired};
pub use planner::{chunk_by_plan, plan_sizes};

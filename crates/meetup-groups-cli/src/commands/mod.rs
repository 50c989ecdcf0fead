//! Subcommand implementations for the `meetup-groups` binary.

pub mod group;
pub mod plan;
pub mod watch;

//! `meetup-groups` binary.

use clap::{Parser, Subcommand};
use meetup_groups_cli::commands::{group, plan, watch};
use tracing_subscriber::{fmt, EnvFilter};

/// Form meetup groups from user traits and locations
#[derive(Parser)]
#[command(name = "meetup-groups")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch users, form groups, and write the export file
    Group(group::GroupArgs),
    /// Subscribe to the groups topic and print new groups
    Watch(watch::WatchArgs),
    /// Show how a headcount is split into group sizes
    Plan(plan::PlanArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("meetup_groups=info,meetup_groups_cli=info")),
        1 => EnvFilter::new("meetup_groups=debug,meetup_groups_cli=debug"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Group(args) => group::run(args).await,
        Commands::Watch(args) => watch::run(args).await,
        Commands::Plan(args) => plan::run(args),
    }
}

//! `meetup-groups group`: fetch users, form groups, export, optionally publish.

use crate::backend;
use crate::export::save_groups;
use crate::output::{self, Styled};
use crate::settings::{self, ENV_BACKEND_URL, ENV_WS_URI};
use crate::transport::{publish_groups, ReconnectPolicy};
use anyhow::{bail, Context, Result};
use clap::Args;
use meetup_groups::{GroupingConfig, GroupingEngine, GroupingOutcome};
use serde_json::Value;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Groups shown in the terminal preview.
const PREVIEW_LIMIT: usize = 10;

/// Publish attempts before giving up.
const PUBLISH_ATTEMPTS: u32 = 3;

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Read user records from a JSON file instead of the backend
    #[arg(long, conflicts_with = "backend")]
    pub input: Option<PathBuf>,

    /// Backend base URL [env: MEETUP_BACKEND_URL]
    #[arg(long)]
    pub backend: Option<String>,

    /// Where to write the exported groups
    #[arg(short, long, default_value = settings::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// JSON file with grouping settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Weight of the location block relative to traits
    #[arg(long)]
    pub geo_weight: Option<f64>,

    #[arg(long)]
    pub min_size: Option<usize>,

    #[arg(long)]
    pub max_size: Option<usize>,

    /// Seed for the partitioner
    #[arg(long)]
    pub seed: Option<u64>,

    /// Send the groups to the backend over STOMP
    #[arg(long)]
    pub publish: bool,

    /// STOMP WebSocket endpoint [env: MEETUP_WS_URI]
    #[arg(long)]
    pub ws_uri: Option<String>,

    /// Print groups and run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl GroupArgs {
    /// Defaults, config file and environment, then flags.
    pub fn grouping_config(&self) -> Result<GroupingConfig> {
        let mut config = settings::load_grouping_config(self.config.as_deref())?;
        if let Some(w) = self.geo_weight {
            config.geo_weight = w;
        }
        if let Some(min) = self.min_size {
            config.group_min_size = min;
        }
        if let Some(max) = self.max_size {
            config.group_max_size = max;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }

    async fn load_users(&self) -> Result<Value> {
        if let Some(path) = &self.input {
            return backend::read_features(path);
        }
        match settings::flag_or_env(self.backend.clone(), ENV_BACKEND_URL) {
            Some(base) => backend::fetch_features(&base).await,
            None => bail!("no user source: pass --input FILE or --backend URL (or set {ENV_BACKEND_URL})"),
        }
    }
}

/// Run the engine over `doc` with `config`.
pub fn compute(doc: &Value, config: GroupingConfig) -> Result<GroupingOutcome> {
    let engine = GroupingEngine::new(config).context("invalid grouping settings")?;
    let outcome = engine.run_json(doc).context("failed to group users")?;
    Ok(outcome)
}

pub async fn run(args: GroupArgs) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let config = args.grouping_config()?;
    // Resolve the publish target before doing any work.
    let ws_uri = if args.publish {
        match settings::flag_or_env(args.ws_uri.clone(), ENV_WS_URI) {
            Some(uri) => Some(uri),
            None => bail!("--publish needs --ws-uri URI (or {ENV_WS_URI})"),
        }
    } else {
        None
    };

    let doc = args.load_users().await?;
    let outcome = compute(&doc, config)?;
    save_groups(&args.output, &outcome.groups)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "grouping finished");

    if args.json {
        output::print_json(&serde_json::json!({
            "groups": outcome.groups,
            "report": outcome.report,
        }));
    } else {
        let report = &outcome.report;
        eprintln!(
            "  {} {} users -> {} groups {}",
            s.ok_sym(),
            report.users,
            outcome.groups.len(),
            s.dim(&format!("({:.2}s)", start.elapsed().as_secs_f64()))
        );
        if let Some(selection) = &report.selection {
            let score = selection
                .score
                .map(|v| format!("{v:.3}"))
                .unwrap_or_else(|| "n/a".to_string());
            eprintln!(
                "    k={} in {}..={}  silhouette {}{}",
                selection.chosen_k,
                selection.range.min_k,
                selection.range.max_k,
                score,
                if selection.fell_back { "  (fallback)" } else { "" }
            );
        }
        if report.bypass {
            eprintln!(
                "  {} fewer users than the minimum group size; repair skipped",
                s.warn_sym()
            );
        }
        eprintln!();
        output::print_groups(&s, &outcome.groups, PREVIEW_LIMIT);
        eprintln!();
        eprintln!("  Saved to {}", s.cyan(&args.output.display().to_string()));
    }

    if let Some(uri) = ws_uri {
        let policy = ReconnectPolicy::bounded(Duration::from_secs(3), PUBLISH_ATTEMPTS);
        publish_groups(&uri, &outcome.groups, &policy).await?;
        if !args.json {
            eprintln!("  {} Published {} groups", s.ok_sym(), outcome.groups.len());
        }
    }

    Ok(())
}

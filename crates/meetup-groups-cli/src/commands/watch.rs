//! `meetup-groups watch`: print groups broadcast on the groups topic.

use crate::output::{self, Styled};
use crate::settings::{self, ENV_WS_URI};
use crate::transport::{watch_groups, DeliveryGuard, ReconnectPolicy, DEFAULT_GUARD_CAPACITY};
use anyhow::{bail, Result};
use clap::Args;
use meetup_groups::GroupRecord;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// STOMP WebSocket endpoint [env: MEETUP_WS_URI]
    #[arg(long)]
    pub ws_uri: Option<String>,

    /// Pause between reconnect attempts
    #[arg(long, default_value_t = 3000)]
    pub retry_delay_ms: u64,

    /// Give up after this many failed connects (default: never)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Remembered group ids for de-duplication
    #[arg(long, default_value_t = DEFAULT_GUARD_CAPACITY)]
    pub dedup_capacity: usize,

    /// Print each group as one JSON line on stdout
    #[arg(long)]
    pub json: bool,
}

impl WatchArgs {
    pub fn policy(&self) -> ReconnectPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.max_attempts {
            Some(max) => ReconnectPolicy::bounded(delay, max),
            None => ReconnectPolicy::unbounded(delay),
        }
    }
}

/// One group as a JSON line; serialization failures are logged and skipped.
fn json_line(group: &GroupRecord) -> Option<String> {
    match serde_json::to_string(group) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(group_id = group.group_id, "failed to encode group: {e}");
            None
        }
    }
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let Some(uri) = settings::flag_or_env(args.ws_uri.clone(), ENV_WS_URI) else {
        bail!("watch needs --ws-uri URI (or {ENV_WS_URI})");
    };
    let policy = args.policy();
    let mut guard = DeliveryGuard::new(args.dedup_capacity);
    let s = Styled::new();
    let json = args.json;

    let watching = watch_groups(&uri, &policy, &mut guard, |group| {
        if json {
            if let Some(line) = json_line(group) {
                println!("{line}");
            }
        } else {
            let now = chrono::Local::now().format("%H:%M:%S");
            eprintln!(
                "  {} {}",
                s.dim(&now.to_string()),
                output::group_line(&s, group)
            );
        }
    });

    tokio::select! {
        result = watching => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping watch");
        }
    }
    Ok(())
}

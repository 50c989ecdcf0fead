//! Backing-store access: fetch user feature records.

use crate::settings::FEATURES_PATH;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Build the features endpoint URL from the backend base URL.
pub fn features_url(base_url: &str) -> Result<url::Url> {
    let base = url::Url::parse(base_url)
        .with_context(|| format!("invalid backend URL: {base_url}"))?;
    let trimmed = base.path().trim_end_matches('/');
    let mut url = base.clone();
    url.set_path(&format!("{trimmed}{FEATURES_PATH}"));
    Ok(url)
}

/// GET the features list. The response must be a JSON array.
pub async fn fetch_features(base_url: &str) -> Result<Value> {
    let url = features_url(base_url)?;
    info!("GET {url}");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    info!(%status, "features response");
    if !status.is_success() {
        bail!("backend returned {status} for {url}");
    }

    let body: Value = resp
        .json()
        .await
        .context("features response is not valid JSON")?;
    ensure_array(body)
}

/// Read a features list from a local JSON file.
pub fn read_features(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("input is not valid JSON: {}", path.display()))?;
    ensure_array(doc)
}

fn ensure_array(doc: Value) -> Result<Value> {
    if !doc.is_array() {
        bail!("expected a JSON array of user records, got: {}", preview(&doc));
    }
    Ok(doc)
}

fn preview(doc: &Value) -> String {
    let text = doc.to_string();
    match text.char_indices().nth(200) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

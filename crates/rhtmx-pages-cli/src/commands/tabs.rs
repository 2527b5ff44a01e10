use anyhow::{Context, Result};
use colored::Colorize;
use rhtmx_pages::{Manifest, TabIndex};
use serde_json::Value;

use super::state_handle;

pub async fn execute(manifest: &Manifest, state: Vec<(String, Value)>, json: bool) -> Result<()> {
    let state = state_handle(state);
    let tabs = TabIndex::from_config(&manifest.config)
        .list(&manifest.registry(), &state)
        .await;

    if json {
        let rendered = serde_json::to_string_pretty(&tabs).context("Failed to serialize tabs")?;
        println!("{}", rendered);
        return Ok(());
    }

    if tabs.is_empty() {
        println!("{}", "No tabs visible".yellow());
        return Ok(());
    }

    println!("{}", "Tabs".green().bold());
    println!();
    for tab in &tabs {
        println!("  {:<24} {} ({})", tab.label.cyan(), tab.pattern, tab.component);
    }

    Ok(())
}

use anyhow::{Context, Result};
use colored::Colorize;
use rhtmx_pages::{Manifest, RouteCompiler, RouteKind};

pub fn execute(manifest: &Manifest, json: bool) -> Result<()> {
    let table = RouteCompiler::from_config(&manifest.config).compile(&manifest.registry());
    let summary = table.summary();

    if json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("Failed to serialize route table")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Routes".green().bold());
    println!();

    for entry in &summary.entries {
        let kind = match entry.kind {
            RouteKind::Normal => entry.kind.to_string().normal(),
            RouteKind::Error => entry.kind.to_string().yellow(),
            RouteKind::Fallback => entry.kind.to_string().dimmed(),
        };
        let key = entry.key.as_deref().unwrap_or("-");
        let gate = if entry.gated { " (gated)" } else { "" };

        println!("  {:<28} {:<9} {}{}", entry.pattern.cyan(), kind, key, gate.dimmed());
    }

    println!();
    if summary.error_aliases.is_empty() {
        println!("Aliases: {}", "none".dimmed());
    } else {
        println!("Aliases:");
        for (error_type, key) in &summary.error_aliases {
            println!("  {} → {}", error_type.yellow(), key);
        }
    }
    println!("Root: {}", if summary.has_root { "Yes" } else { "No" });

    Ok(())
}

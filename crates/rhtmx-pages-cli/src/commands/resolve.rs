use anyhow::{Context, Result};
use colored::Colorize;
use rhtmx_pages::{Element, Manifest, Navigator, Outcome, RouteCompiler};
use serde_json::Value;

use super::state_handle;

pub async fn execute(
    manifest: &Manifest,
    path: &str,
    state: Vec<(String, Value)>,
    json: bool,
) -> Result<()> {
    let table = RouteCompiler::from_config(&manifest.config).compile(&manifest.registry());
    let navigator = Navigator::from_config(table, state_handle(state), &manifest.config);

    let navigation = match navigator.navigate(path).await {
        Outcome::Committed(navigation) => navigation,
        Outcome::Superseded { path, .. } => anyhow::bail!("Navigation to '{}' was superseded", path),
    };

    if json {
        let rendered =
            serde_json::to_string_pretty(&navigation).context("Failed to serialize navigation")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Path:    {}", navigation.path.cyan());
    println!("Pattern: {}", navigation.pattern);

    if !navigation.params.is_empty() {
        let mut params: Vec<_> = navigation.params.iter().collect();
        params.sort();
        println!("Params:");
        for (name, value) in params {
            println!("  {} = {}", name, value);
        }
    }

    match &navigation.element {
        Element::Page {
            key,
            component,
            layouts,
            title,
        } => {
            println!("Renders: {} {}", component.green().bold(), format!("({})", key).dimmed());
            if !layouts.is_empty() {
                println!("Layouts: {}", layouts.join(" > "));
            }
            if let Some(title) = title {
                println!("Title:   {}", title);
            }
        }
        Element::Redirect { to } => println!("Redirects to {}", to.yellow()),
        Element::Placeholder(placeholder) => println!("Renders: {}", placeholder.text().red()),
    }

    Ok(())
}

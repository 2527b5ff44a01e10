use anyhow::{Context, Result};
use rhtmx_pages::{Manifest, PageEntry, PagesConfig};
use std::path::Path;
use walkdir::WalkDir;

/// Loads the manifest and appends pages discovered under `scan`
///
/// Without a manifest file, `--scan` alone is enough: discovered pages get
/// default settings under the default routing configuration.
pub fn load(manifest_path: &Path, scan: Option<&Path>) -> Result<Manifest> {
    let mut manifest = if manifest_path.exists() {
        Manifest::from_file(manifest_path)
            .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?
    } else if scan.is_some() {
        tracing::debug!(path = %manifest_path.display(), "no manifest, using scanned pages only");
        Manifest::default()
    } else {
        anyhow::bail!(
            "Manifest '{}' not found (pass --manifest or --scan <dir>)",
            manifest_path.display()
        );
    };

    if let Some(dir) = scan {
        let discovered = scan_pages(dir, &manifest.config)
            .with_context(|| format!("Failed to scan {}", dir.display()))?;

        for page in discovered {
            if !manifest.contains_key(&page.key) {
                manifest.pages.push(page);
            }
        }
    }

    Ok(manifest)
}

/// Finds page files under `dir`, keyed as `<pages_root>/<relative path>`
///
/// Only files with a configured extension are kept. Sorted by key.
pub fn scan_pages(dir: &Path, config: &PagesConfig) -> Result<Vec<PageEntry>> {
    if !dir.is_dir() {
        anyhow::bail!("'{}' is not a directory", dir.display());
    }

    let mut pages = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.extensions.iter().any(|known| known == ext));
        if !known {
            continue;
        }

        let relative = path.strip_prefix(dir)?;
        let relative = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let root = config.pages_root.trim_matches('/');
        let key = if root.is_empty() {
            relative.clone()
        } else {
            format!("{}/{}", root, relative)
        };

        pages.push(PageEntry::new(key, relative));
    }

    pages.sort_by(|a, b| a.key.cmp(&b.key));
    tracing::debug!(dir = %dir.display(), found = pages.len(), "scanned page files");

    Ok(pages)
}

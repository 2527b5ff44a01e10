// File: src/config.rs
// Purpose: Routing configuration parsing from pages.toml

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Routing configuration (the `[routing]` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    /// Registry prefix stripped from every key (default: "pages")
    #[serde(default = "default_pages_root")]
    pub pages_root: String,

    /// Extensions stripped from the final key segment
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Reserved pattern space for error aliases (default: "/__error")
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,

    /// Verdict for pages without an `access` setting (default: deny)
    #[serde(default)]
    pub default_access: AccessDefault,

    /// Whether the reference matcher ignores ASCII case (default: false)
    #[serde(default)]
    pub case_insensitive: bool,

    /// Upper bound for one access evaluation during navigation
    #[serde(default)]
    pub evaluation_timeout_ms: Option<u64>,
}

/// Policy for pages that carry no `access` setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessDefault {
    /// Fail closed
    #[default]
    Deny,
    /// Treat unconfigured pages as public
    Allow,
}

// Default values
fn default_pages_root() -> String {
    "pages".to_string()
}

pub(crate) fn default_extensions() -> Vec<String> {
    ["rsx", "rs", "jsx", "tsx", "js", "ts", "html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_alias_prefix() -> String {
    "/__error".to_string()
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            pages_root: default_pages_root(),
            extensions: default_extensions(),
            alias_prefix: default_alias_prefix(),
            default_access: AccessDefault::Deny,
            case_insensitive: false,
            evaluation_timeout_ms: None,
        }
    }
}

impl PagesConfig {
    /// Parses the `[routing]` table out of a TOML document
    ///
    /// Other top-level tables (such as `[[page]]` entries) are ignored here.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let file: toml::Table = toml::from_str(content)?;

        match file.get("routing") {
            Some(routing) => Ok(routing.clone().try_into()?),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_toml(&content)
    }

    /// Loads configuration, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no routing config found, using defaults");
            Ok(Self::default())
        }
    }

    /// Alias prefix without trailing slash, always starting with `/`
    pub fn alias_root(&self) -> String {
        format!("/{}", self.alias_prefix.trim_matches('/'))
    }

    pub fn evaluation_timeout(&self) -> Option<Duration> {
        self.evaluation_timeout_ms.map(Duration::from_millis)
    }
}

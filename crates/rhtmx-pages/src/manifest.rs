// File: src/manifest.rs
// Purpose: Page registry described as a TOML document

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::{AccessSpec, StateAccessor};
use crate::config::PagesConfig;
use crate::error::ManifestError;
use crate::registry::{PageDescriptor, PageSettings, Registry};

/// Access rule expressible in data
///
/// ```toml
/// access = true
/// access = { requires = "user" }
/// access = { state = "role", equals = "admin" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessRule {
    Literal(bool),
    Requires(RequiresRule),
    Equals(EqualsRule),
}

/// Granted when the state key holds a truthy value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiresRule {
    pub requires: String,
}

/// Granted when the state key equals the given value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EqualsRule {
    pub state: String,
    pub equals: Value,
}

impl AccessRule {
    pub fn to_spec(&self) -> AccessSpec {
        match self {
            AccessRule::Literal(value) => AccessSpec::Literal(*value),
            AccessRule::Requires(rule) => {
                let key = rule.requires.clone();
                AccessSpec::predicate(move |state: &dyn StateAccessor| Ok(state.is_truthy(&key)))
            }
            AccessRule::Equals(rule) => {
                let key = rule.state.clone();
                let expected = rule.equals.clone();
                AccessSpec::predicate(move |state: &dyn StateAccessor| {
                    Ok(state.get(&key).as_ref() == Some(&expected))
                })
            }
        }
    }
}

/// `[page.settings]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsEntry {
    #[serde(default)]
    pub access: Option<AccessRule>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tab: bool,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub not_found: bool,
    #[serde(default)]
    pub title: Option<String>,
}

impl SettingsEntry {
    pub fn to_settings(&self) -> PageSettings {
        PageSettings {
            access: self.access.as_ref().map(AccessRule::to_spec),
            label: self.label.clone(),
            tab: self.tab,
            error_type: self.error_type.clone(),
            not_found: self.not_found,
            title: self.title.clone(),
        }
    }
}

/// One `[[page]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageEntry {
    pub key: String,
    pub component: String,
    #[serde(default)]
    pub settings: SettingsEntry,
}

impl PageEntry {
    /// Entry with default settings (access falls back to the configured policy)
    pub fn new(key: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            component: component.into(),
            settings: SettingsEntry::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    routing: PagesConfig,
    #[serde(default, rename = "page")]
    pages: Vec<PageEntry>,
}

/// Routing configuration plus the ordered page list
///
/// # Examples
///
/// ```
/// use rhtmx_pages::manifest::Manifest;
///
/// let manifest = Manifest::parse(r#"
///     [[page]]
///     key = "pages/index.rsx"
///     component = "Home"
///     settings = { access = true }
/// "#).unwrap();
///
/// let registry = manifest.registry();
/// assert_eq!(registry.get("pages/index.rsx").unwrap().component, "Home");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub config: PagesConfig,
    pub pages: Vec<PageEntry>,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(content)?;

        Ok(Self {
            config: file.routing,
            pages: file.pages,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), pages = manifest.pages.len(), "loaded page manifest");
        Ok(manifest)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pages.iter().any(|page| page.key == key)
    }

    /// Builds the registry; a key listed twice keeps its first position and
    /// its last settings
    pub fn registry(&self) -> Registry<String> {
        self.pages
            .iter()
            .map(|page| {
                PageDescriptor::new(page.key.clone(), page.component.clone())
                    .with_settings(page.settings.to_settings())
            })
            .collect()
    }
}

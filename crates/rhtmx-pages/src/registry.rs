//! Page registry: the ordered input to the route compiler

use crate::access::AccessSpec;
use crate::pattern::KeyPath;

/// File name that marks a folder layout
pub const LAYOUT_FILE: &str = "_layout";
/// File name of the legacy not-found page
pub const NOT_FOUND_FILE: &str = "_404";
/// Alias key of the not-found target
pub const NOT_FOUND: &str = "404";
/// Alias key rendered when access is denied
pub const UNAUTHORIZED: &str = "401";

/// Recognized settings of one page
///
/// # Examples
///
/// ```
/// use rhtmx_pages::registry::PageSettings;
///
/// let settings = PageSettings::new().allow().with_label("dashboard").as_tab();
/// assert!(settings.tab);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    /// `None` falls back to the configured default policy
    pub access: Option<AccessSpec>,
    /// Replaces the final path segment
    pub label: Option<String>,
    /// Listed by the tab index
    pub tab: bool,
    /// Marks the page as an error alias (`"401"`, `"404"`, ...)
    pub error_type: Option<String>,
    /// Legacy spelling of `error_type = "404"`
    pub not_found: bool,
    /// Carried through to rendered elements and tabs
    pub title: Option<String>,
}

impl PageSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access(mut self, access: impl Into<AccessSpec>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn allow(self) -> Self {
        self.with_access(true)
    }

    pub fn deny(self) -> Self {
        self.with_access(false)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn as_tab(mut self) -> Self {
        self.tab = true;
        self
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn as_not_found(mut self) -> Self {
        self.not_found = true;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// How the compiler treats a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRole {
    /// Routed under its own pattern, access gated
    Normal,
    /// Render target for an error type, never gated
    ErrorAlias(String),
    /// Wraps every page in its folder and below
    Layout,
}

impl PageRole {
    /// Classifies a descriptor
    ///
    /// `_layout` files are layouts whatever their settings say. Otherwise an
    /// explicit `error_type` wins over `not_found` and the `_404` file name.
    pub fn classify(settings: &PageSettings, key: &KeyPath) -> Self {
        let file = key.file_name();

        if file == Some(LAYOUT_FILE) {
            return PageRole::Layout;
        }

        match &settings.error_type {
            Some(error_type) => PageRole::ErrorAlias(error_type.clone()),
            None if settings.not_found || file == Some(NOT_FOUND_FILE) => {
                PageRole::ErrorAlias(NOT_FOUND.to_string())
            }
            None => PageRole::Normal,
        }
    }
}

/// One registry entry
#[derive(Debug, Clone)]
pub struct PageDescriptor<C> {
    pub key: String,
    pub component: C,
    pub settings: PageSettings,
}

impl<C> PageDescriptor<C> {
    pub fn new(key: impl Into<String>, component: C) -> Self {
        Self {
            key: key.into(),
            component,
            settings: PageSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PageSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Ordered page registry
///
/// Iteration follows insertion order. Inserting a key that is already
/// present replaces its descriptor in place: the position stays, the value
/// is the later one.
///
/// # Examples
///
/// ```
/// use rhtmx_pages::registry::{PageSettings, Registry};
///
/// let mut registry = Registry::new();
/// registry.register("pages/index.rsx", "Home", PageSettings::new().allow());
/// registry.register("pages/about.rsx", "About", PageSettings::new().allow());
/// registry.register("pages/index.rsx", "Landing", PageSettings::new().allow());
///
/// let keys: Vec<&str> = registry.keys().collect();
/// assert_eq!(keys, ["pages/index.rsx", "pages/about.rsx"]);
/// assert_eq!(registry.get("pages/index.rsx").unwrap().component, "Landing");
/// ```
#[derive(Debug, Clone)]
pub struct Registry<C> {
    pages: Vec<PageDescriptor<C>>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Adds a descriptor, returning the one it replaced
    pub fn insert(&mut self, page: PageDescriptor<C>) -> Option<PageDescriptor<C>> {
        match self.pages.iter_mut().find(|existing| existing.key == page.key) {
            Some(existing) => {
                tracing::debug!(key = %page.key, "registry key registered again, replacing");
                Some(std::mem::replace(existing, page))
            }
            None => {
                self.pages.push(page);
                None
            }
        }
    }

    pub fn register(&mut self, key: impl Into<String>, component: C, settings: PageSettings) {
        self.insert(PageDescriptor::new(key, component).with_settings(settings));
    }

    pub fn get(&self, key: &str) -> Option<&PageDescriptor<C>> {
        self.pages.iter().find(|page| page.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageDescriptor<C>> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Extend<PageDescriptor<C>> for Registry<C> {
    fn extend<I: IntoIterator<Item = PageDescriptor<C>>>(&mut self, iter: I) {
        for page in iter {
            self.insert(page);
        }
    }
}

impl<C> FromIterator<PageDescriptor<C>> for Registry<C> {
    fn from_iter<I: IntoIterator<Item = PageDescriptor<C>>>(iter: I) -> Self {
        let mut registry = Registry::new();
        registry.extend(iter);
        registry
    }
}

impl<'a, C> IntoIterator for &'a Registry<C> {
    type Item = &'a PageDescriptor<C>;
    type IntoIter = std::slice::Iter<'a, PageDescriptor<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

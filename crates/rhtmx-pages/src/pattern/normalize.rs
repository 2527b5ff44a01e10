/// Registry key normalization
///
/// Turns file-system-shaped registry keys (`pages/blog/[slug].rsx`) into
/// route patterns (`/blog/:slug`). Never fails: odd keys degrade to literal
/// segments.

use super::{classify_segment, RoutePattern};
use crate::config::PagesConfig;

/// A registry key with the pages root, extension and trailing `index` removed
///
/// `folder` keeps the raw (untranslated) folder segments; `file` is the last
/// segment, or `None` for the root page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    folder: Vec<String>,
    file: Option<String>,
    index: bool,
}

impl KeyPath {
    /// Raw folder segments, outermost first
    pub fn folder_segments(&self) -> &[String] {
        &self.folder
    }

    /// Folder in `/a/b` form (`/` for the pages root)
    pub fn folder(&self) -> String {
        format!("/{}", self.folder.join("/"))
    }

    /// Final segment after stripping (`None` for the root page)
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// True when the key resolves to the empty path (`index`, `pages/index.rsx`, ...)
    pub fn is_root(&self) -> bool {
        self.folder.is_empty() && self.file.is_none()
    }

    /// Folder whose layouts wrap this page
    ///
    /// Same as [`folder`](Self::folder) except for `index` files, which live
    /// inside the folder they stand for: `pages/admin/index.rsx` is wrapped
    /// by `pages/admin/_layout.rsx`.
    pub fn page_folder(&self) -> String {
        match (&self.file, self.index) {
            (Some(file), true) => {
                let mut folder = self.folder.clone();
                folder.push(file.clone());
                format!("/{}", folder.join("/"))
            }
            _ => self.folder(),
        }
    }
}

/// Converts registry keys into route patterns
///
/// Holds the registry prefix and the recognized file extensions, both taken
/// from [`PagesConfig`].
///
/// # Examples
///
/// ```
/// use rhtmx_pages::pattern::PathNormalizer;
///
/// let normalizer = PathNormalizer::new("pages");
/// assert_eq!(normalizer.normalize("pages/blog/[slug].rsx", None).to_string(), "/blog/:slug");
/// assert_eq!(normalizer.normalize("pages/docs/[...rest].rsx", None).to_string(), "/docs/*rest");
/// assert_eq!(normalizer.normalize("pages/index.rsx", None).to_string(), "/");
/// assert_eq!(normalizer.normalize("pages/team/about.rsx", Some("people")).to_string(), "/team/people");
/// ```
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    root: String,
    extensions: Vec<String>,
}

impl PathNormalizer {
    /// Creates a normalizer for `registry_prefix` with the default extension list
    pub fn new(registry_prefix: impl AsRef<str>) -> Self {
        Self {
            root: trim_key(registry_prefix.as_ref()).to_string(),
            extensions: crate::config::default_extensions(),
        }
    }

    /// Creates a normalizer from the routing configuration
    pub fn from_config(config: &PagesConfig) -> Self {
        Self {
            root: trim_key(&config.pages_root).to_string(),
            extensions: config.extensions.clone(),
        }
    }

    /// Replaces the recognized extension list
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Strips root prefix, extension and trailing `index` from a raw key
    pub fn key_path(&self, raw_key: &str) -> KeyPath {
        let relative = self.strip_root(trim_key(raw_key));

        let mut segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

        if let Some(last) = segments.last_mut() {
            *last = self.strip_extension(*last);
        }

        let index = segments.last() == Some(&"index");
        if index {
            segments.pop();
        }

        let file = segments.pop().map(str::to_string);

        KeyPath {
            folder: segments.into_iter().map(str::to_string).collect(),
            file,
            index,
        }
    }

    /// Normalizes a raw registry key into a route pattern
    ///
    /// `label`, when present, replaces the final path segment (the folder
    /// prefix is kept). A label of `/` always yields the root pattern.
    pub fn normalize(&self, raw_key: &str, label: Option<&str>) -> RoutePattern {
        self.pattern_for(&self.key_path(raw_key), label)
    }

    /// Builds the pattern for an already split key
    pub fn pattern_for(&self, key: &KeyPath, label: Option<&str>) -> RoutePattern {
        if label.map(str::trim) == Some("/") || key.is_root() {
            return RoutePattern::root();
        }

        let last: Vec<&str> = match label {
            Some(label) => label.split('/').filter(|s| !s.is_empty()).collect(),
            None => key.file.as_deref().into_iter().collect(),
        };

        key.folder
            .iter()
            .map(String::as_str)
            .chain(last)
            .map(classify_segment)
            .collect()
    }

    fn strip_root<'k>(&self, key: &'k str) -> &'k str {
        if self.root.is_empty() {
            return key;
        }

        match key.strip_prefix(self.root.as_str()) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => key,
        }
    }

    fn strip_extension<'s>(&self, segment: &'s str) -> &'s str {
        match segment.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty() && self.extensions.iter().any(|known| known == ext) =>
            {
                stem
            }
            _ => segment,
        }
    }
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::from_config(&PagesConfig::default())
    }
}

/// Normalizes `raw_key` relative to `registry_prefix` with default settings
///
/// # Examples
///
/// ```
/// use rhtmx_pages::pattern::normalize;
///
/// assert_eq!(normalize("./pages/blog/index.jsx", "pages").to_string(), "/blog");
/// ```
pub fn normalize(raw_key: &str, registry_prefix: &str) -> RoutePattern {
    PathNormalizer::new(registry_prefix).normalize(raw_key, None)
}

/// Drops `./` and leading/trailing slashes
fn trim_key(key: &str) -> &str {
    key.trim_start_matches("./").trim_matches('/')
}

/// Navigation path utilities
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::FolderHierarchy;

/// Validates if a navigation path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use rhtmx_pages::path::is_canonical;
///
/// assert!(is_canonical("/"));
/// assert!(is_canonical("/blog/hello"));
///
/// assert!(!is_canonical(""));
/// assert!(!is_canonical("blog")); // Missing leading /
/// assert!(!is_canonical("/blog/")); // Trailing /
/// assert!(!is_canonical("/blog//hello")); // Double //
/// ```
pub fn is_canonical(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalizes a navigation target to canonical form
///
/// Returns `Cow::Borrowed` when the input is already canonical, so the
/// common case costs no allocation.
///
/// Handles the usual mistakes:
/// - Trailing slashes: `/path/` → `/path`
/// - Double slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
/// - Missing leading slash: `path` → `/path`
///
/// Query strings and fragments are dropped, the matcher only sees the path.
///
/// # Examples
///
/// ```
/// use rhtmx_pages::path::normalize_target;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_target("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_target("/about/"), "/about");
/// assert_eq!(normalize_target("\\users\\123"), "/users/123");
/// assert_eq!(normalize_target("/docs?page=2#top"), "/docs");
/// assert_eq!(normalize_target(""), "/");
/// ```
pub fn normalize_target(path: &str) -> Cow<'_, str> {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    if is_canonical(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Splits a canonical path into its non-empty segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

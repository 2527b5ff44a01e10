/// Lazy iterator over a folder and its ancestors, innermost first
///
/// For folder `/admin/users/edit`, yields: `/admin/users/edit` → `/admin/users` → `/admin` → `/`
///
/// Used to collect the layout chain of a page: every folder on the way up may
/// contribute a `_layout`. Only borrows from the input string.
///
/// # Examples
///
/// ```
/// use rhtmx_pages::path::FolderHierarchy;
///
/// let folders: Vec<&str> = FolderHierarchy::new("/a/b/c").collect();
/// assert_eq!(folders, vec!["/a/b/c", "/a/b", "/a", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct FolderHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> FolderHierarchy<'a> {
    /// Starts the walk at `folder` (expected in `/a/b` form, `/` for the root)
    pub fn new(folder: &'a str) -> Self {
        Self {
            current: Some(folder),
        }
    }
}

impl<'a> Iterator for FolderHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = match current.rfind('/') {
            _ if current == "/" || current.is_empty() => None,
            Some(0) => Some("/"),
            Some(slash_pos) => Some(&current[..slash_pos]),
            None => Some("/"),
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_to_root() {
        let folders: Vec<&str> = FolderHierarchy::new("/a/b/c/d").collect();
        assert_eq!(folders, vec!["/a/b/c/d", "/a/b/c", "/a/b", "/a", "/"]);
    }

    #[test]
    fn test_root_only() {
        let folders: Vec<&str> = FolderHierarchy::new("/").collect();
        assert_eq!(folders, vec!["/"]);
    }

    #[test]
    fn test_stops_early_with_find() {
        let mut iter = FolderHierarchy::new("/a/b/c");
        assert_eq!(iter.find(|&f| f == "/a/b"), Some("/a/b"));
        assert_eq!(iter.next(), Some("/a"));
    }
}

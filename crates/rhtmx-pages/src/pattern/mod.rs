/// Route patterns compiled from registry keys
///
/// A [`RoutePattern`] is an ordered list of literal, parameter and catch-all
/// segments. The root page is the zero-segment pattern `/`.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

mod normalize;
mod segment;

pub use normalize::{normalize, KeyPath, PathNormalizer};
pub use segment::classify_segment;

/// Parameters captured while matching a path
pub type Params = HashMap<String, String>;

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches the exact text
    Literal(String),
    /// `[name]`: matches exactly one segment
    Param(String),
    /// `[...name]`: matches the remainder of the path, zero or more segments
    CatchAll(String),
}

impl Segment {
    /// Ordering rank used by [`RoutePattern::specificity`]
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Param(_) => 1,
            Segment::CatchAll(_) => 2,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Param(name) => write!(f, ":{}", name),
            Segment::CatchAll(name) => write!(f, "*{}", name),
        }
    }
}

/// Normalized URL-matching template
///
/// Displayed as `/blog/:slug` or `/docs/*rest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// The zero-segment root pattern `/`
    pub fn root() -> Self {
        Self::default()
    }

    /// Pattern made only of literal segments (used for the reserved alias space)
    pub fn literal(path: &str) -> Self {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|s| Segment::Literal(s.to_string()))
            .collect()
    }

    /// The table's wildcard entry, displayed as `/*`
    pub fn fallback() -> Self {
        Self::literal("*")
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for the pattern that matches every path (`/*rest`), i.e. the
    /// same space as the table's wildcard fallback
    pub fn is_root_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::CatchAll(_)])
            || matches!(self.segments.as_slice(), [Segment::Literal(text)] if text == "*")
    }

    pub fn has_catch_all(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::CatchAll(_)))
    }

    /// Names of all parameter and catch-all segments, in order
    pub fn params(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// True when both patterns match exactly the same paths
    ///
    /// Parameter names are ignored: `/blog/:slug` and `/blog/:id` overlap.
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    (Segment::CatchAll(_), Segment::CatchAll(_)) => true,
                    _ => false,
                })
    }

    /// Sort key for matching order: lower matches first
    ///
    /// Compared segment by segment, literal before parameter before catch-all,
    /// so `/users/new` is tried before `/users/:id`, which is tried before
    /// `/users/*rest`. Equal keys keep registration order.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    /// Matches a canonical navigation path against this pattern
    ///
    /// Returns the captured parameters on success. Catch-all captures are the
    /// remaining segments joined with `/` (empty when nothing remains).
    /// Captured values are percent-decoded; undecodable input is kept raw.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pages::pattern::normalize;
    ///
    /// let pattern = normalize("pages/docs/[...rest].rsx", "pages");
    /// assert_eq!(pattern.matches("/docs/a/b", false).unwrap()["rest"], "a/b");
    /// assert_eq!(pattern.matches("/docs", false).unwrap()["rest"], "");
    /// assert!(pattern.matches("/blog", false).is_none());
    /// ```
    pub fn matches(&self, path: &str, case_insensitive: bool) -> Option<Params> {
        let path_segments = crate::path::segments(path);
        match_segments(&self.segments, &path_segments, Params::new(), case_insensitive)
    }
}

/// Walks pattern and path segments together, backtracking only on catch-alls
fn match_segments(
    pattern: &[Segment],
    path: &[&str],
    mut params: Params,
    case_insensitive: bool,
) -> Option<Params> {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty().then_some(params);
    };

    match head {
        Segment::CatchAll(name) => {
            // Leave enough segments for whatever follows the catch-all
            let fixed_tail = rest
                .iter()
                .filter(|s| !matches!(s, Segment::CatchAll(_)))
                .count();
            let available = path.len().checked_sub(fixed_tail)?;

            (0..=available).rev().find_map(|take| {
                let mut attempt = params.clone();
                attempt.insert(name.clone(), decode(&path[..take].join("/")));
                match_segments(rest, &path[take..], attempt, case_insensitive)
            })
        }
        Segment::Param(name) => {
            let (value, remaining) = path.split_first()?;
            params.insert(name.clone(), decode(value));
            match_segments(rest, remaining, params, case_insensitive)
        }
        Segment::Literal(text) => {
            let (value, remaining) = path.split_first()?;
            let equal = if case_insensitive {
                text.eq_ignore_ascii_case(value)
            } else {
                text.as_str() == *value
            };

            if !equal {
                return None;
            }

            match_segments(rest, remaining, params, case_insensitive)
        }
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

impl FromIterator<Segment> for RoutePattern {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }

        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }

        Ok(())
    }
}

impl Serialize for RoutePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn pattern(key: &str) -> RoutePattern {
        normalize(key, "pages")
    }

    #[test]
    fn test_root_display() {
        assert_eq!(RoutePattern::root().to_string(), "/");
        assert!(RoutePattern::root().is_root());
    }

    #[test]
    fn test_literal_pattern() {
        let alias = RoutePattern::literal("/__error/401");
        assert_eq!(alias.to_string(), "/__error/401");
        assert!(alias.params().is_empty());
    }

    #[rstest]
    #[case("/", "pages/index.rsx", true)]
    #[case("/about", "pages/about.rsx", true)]
    #[case("/about", "pages/index.rsx", false)]
    #[case("/about/team", "pages/about.rsx", false)]
    #[case("/blog/hello", "pages/blog/[slug].rsx", true)]
    #[case("/blog", "pages/blog/[slug].rsx", false)]
    #[case("/blog/a/b", "pages/blog/[slug].rsx", false)]
    #[case("/docs", "pages/docs/[...rest].rsx", true)]
    #[case("/docs/a/b/c", "pages/docs/[...rest].rsx", true)]
    fn test_matches(#[case] path: &str, #[case] key: &str, #[case] expected: bool) {
        assert_eq!(pattern(key).matches(path, false).is_some(), expected);
    }

    #[test]
    fn test_param_capture() {
        let params = pattern("pages/users/[id]/posts/[post].rsx")
            .matches("/users/42/posts/hello%20world", false)
            .unwrap();
        assert_eq!(params["id"], "42");
        assert_eq!(params["post"], "hello world");
    }

    #[test]
    fn test_catch_all_captures_remainder() {
        let params = pattern("pages/docs/[...rest].rsx")
            .matches("/docs/guide/intro", false)
            .unwrap();
        assert_eq!(params["rest"], "guide/intro");
    }

    #[test]
    fn test_catch_all_followed_by_literal() {
        let p = pattern("pages/files/[...path]/raw.rsx");
        assert_eq!(p.matches("/files/a/b/raw", false).unwrap()["path"], "a/b");
        assert_eq!(p.matches("/files/raw", false).unwrap()["path"], "");
        assert!(p.matches("/files/a/b", false).is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let p = pattern("pages/About.rsx");
        assert!(p.matches("/about", false).is_none());
        assert!(p.matches("/about", true).is_some());
    }

    #[test]
    fn test_root_catch_all_detection() {
        assert!(pattern("pages/[...all].rsx").is_root_catch_all());
        assert!(!pattern("pages/docs/[...all].rsx").is_root_catch_all());
        assert!(!pattern("pages/[id].rsx").is_root_catch_all());
        assert!(RoutePattern::fallback().is_root_catch_all());
        assert_eq!(RoutePattern::fallback().to_string(), "/*");
    }

    #[test]
    fn test_specificity_order() {
        let mut patterns = vec![
            pattern("pages/users/[...rest].rsx"),
            pattern("pages/users/[id].rsx"),
            pattern("pages/users/new.rsx"),
        ];
        patterns.sort_by_key(RoutePattern::specificity);

        let shown: Vec<String> = patterns.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["/users/new", "/users/:id", "/users/*rest"]);
    }

    #[test]
    fn test_same_shape_ignores_param_names() {
        assert!(pattern("pages/blog/[slug].rsx").same_shape(&pattern("pages/blog/[id].rsx")));
        assert!(!pattern("pages/blog/[slug].rsx").same_shape(&pattern("pages/blog/new.rsx")));
        assert!(!pattern("pages/blog/[slug].rsx").same_shape(&pattern("pages/blog/[...slug].rsx")));
        assert!(RoutePattern::root().same_shape(&pattern("pages/index.rsx")));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&pattern("pages/blog/[slug].rsx")).unwrap();
        assert_eq!(json, "\"/blog/:slug\"");
    }
}

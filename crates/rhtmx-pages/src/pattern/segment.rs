/// Classification of a single registry-key segment
///
/// Pure parsing of the bracket conventions used in page file names.

use super::Segment;

/// Classifies one key segment into a pattern segment (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Catch-all**: `[...name]` → matches the rest of the path, zero or more segments
/// 2. **Parameter**: `[name]` → matches exactly one segment
/// 3. **Literal**: anything else, including malformed brackets
///
/// Malformed bracket syntax never fails: `[id`, `id]`, `[]`, `[...]` and
/// nested brackets such as `[[id]]` all stay literal.
///
/// # Examples
///
/// ```
/// use rhtmx_pages::pattern::{classify_segment, Segment};
///
/// assert_eq!(classify_segment("about"), Segment::Literal("about".into()));
/// assert_eq!(classify_segment("[slug]"), Segment::Param("slug".into()));
/// assert_eq!(classify_segment("[...rest]"), Segment::CatchAll("rest".into()));
/// assert_eq!(classify_segment("[slug"), Segment::Literal("[slug".into()));
/// ```
pub fn classify_segment(segment: &str) -> Segment {
    let inner = match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) if is_bracket_body(inner) => inner,
        _ => return Segment::Literal(segment.to_string()),
    };

    match inner.strip_prefix("...") {
        Some(name) if is_param_name(name) => Segment::CatchAll(name.to_string()),
        Some(_) => Segment::Literal(segment.to_string()),
        None if is_param_name(inner) => Segment::Param(inner.to_string()),
        None => Segment::Literal(segment.to_string()),
    }
}

/// A bracket body must not itself contain brackets
fn is_bracket_body(inner: &str) -> bool {
    !inner.contains(['[', ']'])
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains('/')
}

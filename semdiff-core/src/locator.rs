//! Locator parsing.
//!
//! A compound locator names two resources separated by a single colon,
//! `<left>:<right>[/<element>]`. Either side may be a bare path (scheme
//! `file`) or a scheme-qualified locator such as `git://src/app.py@HEAD~1`.
//! The separator has to be told apart from colons inside scheme markers and
//! Windows drive prefixes (`C:\src`, `D:/src`).

use std::fmt;
use std::path::Path;

use crate::error::{Result, SemdiffError};

/// Marker between a scheme name and the resource body.
pub const SCHEME_MARKER: &str = "://";

/// Scheme assumed for bare paths.
pub const DEFAULT_SCHEME: &str = "file";

/// Optional prefix accepted in front of a compound locator.
const DIFF_PREFIX: &str = "diff://";

/// A single resource address: scheme plus scheme-specific resource string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceLocator {
    scheme: String,
    resource: String,
}

impl ResourceLocator {
    pub fn new(scheme: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            resource: resource.into(),
        }
    }

    /// Parse `scheme://resource`, or a bare path as the `file` scheme.
    pub fn parse(locator: &str) -> Self {
        match locator.split_once(SCHEME_MARKER) {
            Some((scheme, resource)) if is_scheme_name(scheme) => {
                Self::new(scheme.to_ascii_lowercase(), resource)
            }
            _ => Self::new(DEFAULT_SCHEME, locator),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_file(&self) -> bool {
        self.scheme == DEFAULT_SCHEME
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_file() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}{}{}", self.scheme, SCHEME_MARKER, self.resource)
        }
    }
}

/// A parsed compound locator: two sides and an optional element name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundLocator {
    pub left: ResourceLocator,
    pub right: ResourceLocator,
    pub element: Option<String>,
}

impl CompoundLocator {
    /// Parse against the real filesystem.
    pub fn parse(locator: &str) -> Result<Self> {
        Self::parse_with(locator, |p| p.exists())
    }

    /// Parse using `exists` to decide whether a trailing `/segment` on the
    /// right-hand side is an element name rather than part of the path.
    pub fn parse_with(locator: &str, exists: impl Fn(&Path) -> bool) -> Result<Self> {
        let body = locator.strip_prefix(DIFF_PREFIX).unwrap_or(locator);
        let (left, right) = parse_compound(body)?;

        let left = ResourceLocator::parse(&left);
        let mut right = ResourceLocator::parse(&right);
        let mut element = None;

        if right.is_file() {
            let (path, name) = split_element_suffix(right.resource(), exists);
            if name.is_some() {
                right = ResourceLocator::new(DEFAULT_SCHEME, path);
                element = name;
            }
        }

        Ok(Self {
            left,
            right,
            element,
        })
    }
}

/// Split a compound locator into its left and right resource locators.
///
/// The number of scheme markers decides the strategy:
/// - none: the first colon that is not a drive prefix separates the sides;
/// - one: the marker belongs to the right side when the text before it
///   already holds a colon, otherwise to the left side;
/// - two: `s1://middle:s2://body`, split at the last colon of `middle`;
/// - more: rejected as ambiguous.
pub fn parse_compound(locator: &str) -> Result<(String, String)> {
    let (left, right) = match locator.matches(SCHEME_MARKER).count() {
        0 => split_plain(locator)?,
        1 => split_single_scheme(locator)?,
        2 => split_double_scheme(locator)?,
        n => {
            return Err(SemdiffError::format(format!(
                "'{}' contains {} scheme markers; expected at most one per side, as in \
                 'scheme://left:scheme://right'",
                locator, n
            )))
        }
    };

    if left.is_empty() || right.is_empty() {
        return Err(SemdiffError::format(format!(
            "'{}' must name two resources as '<left>:<right>'",
            locator
        )));
    }

    Ok((left.to_string(), right.to_string()))
}

fn split_plain(locator: &str) -> Result<(&str, &str)> {
    let sep = find_separator(locator).ok_or_else(|| {
        SemdiffError::format(format!(
            "'{}' has no ':' separating the two resources",
            locator
        ))
    })?;
    Ok((&locator[..sep], &locator[sep + 1..]))
}

fn split_single_scheme(locator: &str) -> Result<(&str, &str)> {
    let marker = locator.find(SCHEME_MARKER).unwrap_or(0);
    let before = &locator[..marker];

    if let Some(sep) = before.rfind(':') {
        // `left:scheme://right`
        return Ok((&locator[..sep], &locator[sep + 1..]));
    }

    // `scheme://left:right`
    let body_start = marker + SCHEME_MARKER.len();
    let sep = find_separator(&locator[body_start..]).ok_or_else(|| {
        SemdiffError::format(format!(
            "'{}' has no ':' after the scheme-qualified left side; expected \
             'scheme://left:right'",
            locator
        ))
    })?;
    let sep = body_start + sep;
    Ok((&locator[..sep], &locator[sep + 1..]))
}

fn split_double_scheme(locator: &str) -> Result<(&str, &str)> {
    let first = locator.find(SCHEME_MARKER).unwrap_or(0);
    let middle_start = first + SCHEME_MARKER.len();
    let middle_end = locator[middle_start..]
        .find(SCHEME_MARKER)
        .map(|i| middle_start + i)
        .unwrap_or(locator.len());

    let middle = &locator[middle_start..middle_end];
    let sep = middle.rfind(':').ok_or_else(|| {
        SemdiffError::format(format!(
            "'{}' has no ':' between its two scheme-qualified sides; expected \
             'scheme://left:scheme://right'",
            locator
        ))
    })?;
    let sep = middle_start + sep;
    Ok((&locator[..sep], &locator[sep + 1..]))
}

/// Position of the first colon that is not part of a drive prefix. A lone
/// colon separates even when it looks like one, as in `A:/tmp/b.py`.
fn find_separator(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut colons = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b':')
        .map(|(i, _)| i);
    let first = colons.next()?;
    if colons.next().is_none() {
        return Some(first);
    }
    bytes
        .iter()
        .enumerate()
        .find(|(i, b)| **b == b':' && !is_drive_colon(bytes, *i))
        .map(|(i, _)| i)
}

/// `X:` followed by a path separator, with `X` opening a path segment.
fn is_drive_colon(bytes: &[u8], i: usize) -> bool {
    if i == 0 || !bytes[i - 1].is_ascii_uppercase() {
        return false;
    }
    let segment_start = i == 1 || matches!(bytes[i - 2], b'/' | b'\\' | b':');
    let followed_by_separator = matches!(bytes.get(i + 1), Some(b'/') | Some(b'\\'));
    segment_start && followed_by_separator
}

fn is_scheme_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
}

/// Split `path/element` when `path/element` does not exist but `path` does.
pub fn split_element_suffix(
    resource: &str,
    exists: impl Fn(&Path) -> bool,
) -> (String, Option<String>) {
    if exists(Path::new(resource)) {
        return (resource.to_string(), None);
    }

    match resource.rfind('/') {
        Some(pos) if pos > 0 && pos + 1 < resource.len() => {
            let (base, name) = (&resource[..pos], &resource[pos + 1..]);
            if exists(Path::new(base)) {
                (base.to_string(), Some(name.to_string()))
            } else {
                (resource.to_string(), None)
            }
        }
        _ => (resource.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(s: &str) -> (String, String) {
        parse_compound(s).unwrap()
    }

    fn pair(l: &str, r: &str) -> (String, String) {
        (l.to_string(), r.to_string())
    }

    #[test]
    fn test_plain_paths() {
        assert_eq!(split("app.py:backup/app.py"), pair("app.py", "backup/app.py"));
        assert_eq!(split("src:old_src"), pair("src", "old_src"));
    }

    #[test]
    fn test_round_trip_without_colons() {
        let cases = [
            ("a.py", "b.py"),
            ("src/lib.rs", "../other/src/lib.rs"),
            ("./x", "/abs/y"),
            ("dir with space", "another dir"),
            ("a", "b"),
        ];
        for (left, right) in cases {
            let joined = format!("{}:{}", left, right);
            assert_eq!(split(&joined), pair(left, right), "input: {}", joined);
        }
    }

    #[test]
    fn test_drive_letters() {
        assert_eq!(
            split(r"C:\src\app.py:D:\backup\app.py"),
            pair(r"C:\src\app.py", r"D:\backup\app.py")
        );
        assert_eq!(split("C:/a.py:b.py"), pair("C:/a.py", "b.py"));
        assert_eq!(split("a.py:D:/b.py"), pair("a.py", "D:/b.py"));
    }

    #[test]
    fn test_lone_drive_shaped_colon_separates() {
        assert_eq!(split("A:/tmp/b.py"), pair("A", "/tmp/b.py"));
        assert_eq!(split("src/A:/abs/b.py"), pair("src/A", "/abs/b.py"));
        assert_eq!(split(r"C:pp.py"), pair("C", r"pp.py"));
    }

    #[test]
    fn test_lowercase_letter_is_not_a_drive() {
        assert_eq!(split("c:/x"), pair("c", "/x"));
    }

    #[test]
    fn test_scheme_on_right() {
        assert_eq!(
            split("app.py:git://app.py@HEAD~1"),
            pair("app.py", "git://app.py@HEAD~1")
        );
        assert_eq!(
            split(r"C:\src\app.py:git://app.py@main"),
            pair(r"C:\src\app.py", "git://app.py@main")
        );
    }

    #[test]
    fn test_scheme_on_left() {
        assert_eq!(
            split("git://app.py@HEAD~1:app.py"),
            pair("git://app.py@HEAD~1", "app.py")
        );
        assert_eq!(
            split("git://HEAD~2/src:src"),
            pair("git://HEAD~2/src", "src")
        );
    }

    #[test]
    fn test_two_schemes() {
        assert_eq!(
            split("git://app.py@HEAD~1:git://app.py@HEAD"),
            pair("git://app.py@HEAD~1", "git://app.py@HEAD")
        );
        assert_eq!(
            split("json://a.json:json://b.json"),
            pair("json://a.json", "json://b.json")
        );
    }

    #[test]
    fn test_two_schemes_without_separator_fails() {
        let err = parse_compound("git://a.py@HEADgit://b.py@HEAD").unwrap_err();
        assert!(matches!(err, SemdiffError::Format { .. }));
    }

    #[test]
    fn test_three_schemes_rejected() {
        let err = parse_compound("a://b:c://d:e://f").unwrap_err();
        assert!(matches!(err, SemdiffError::Format { .. }));
    }

    #[test]
    fn test_missing_separator() {
        assert!(parse_compound("app.py").is_err());
        assert!(parse_compound("git://app.py@HEAD").is_err());
    }

    #[test]
    fn test_empty_side_rejected() {
        assert!(parse_compound(":b.py").is_err());
        assert!(parse_compound("a.py:").is_err());
    }

    #[test]
    fn test_resource_locator_parse() {
        let loc = ResourceLocator::parse("git://src/app.py@HEAD");
        assert_eq!(loc.scheme(), "git");
        assert_eq!(loc.resource(), "src/app.py@HEAD");
        assert_eq!(loc.to_string(), "git://src/app.py@HEAD");

        let loc = ResourceLocator::parse("src/app.py");
        assert!(loc.is_file());
        assert_eq!(loc.to_string(), "src/app.py");

        let loc = ResourceLocator::parse(r"C:\src\app.py");
        assert!(loc.is_file());
    }

    #[test]
    fn test_element_suffix() {
        let exists = |p: &Path| p == Path::new("backup/app.py") || p == Path::new("app.py");
        let parsed =
            CompoundLocator::parse_with("app.py:backup/app.py/handle_request", exists).unwrap();
        assert_eq!(parsed.left.resource(), "app.py");
        assert_eq!(parsed.right.resource(), "backup/app.py");
        assert_eq!(parsed.element.as_deref(), Some("handle_request"));
    }

    #[test]
    fn test_no_element_when_path_exists() {
        let exists = |p: &Path| p == Path::new("backup/app.py");
        let parsed = CompoundLocator::parse_with("app.py:backup/app.py", exists).unwrap();
        assert_eq!(parsed.right.resource(), "backup/app.py");
        assert!(parsed.element.is_none());
    }

    #[test]
    fn test_diff_prefix_stripped() {
        let parsed = CompoundLocator::parse_with("diff://a.py:b.py", |_| true).unwrap();
        assert_eq!(parsed.left.resource(), "a.py");
        assert_eq!(parsed.right.resource(), "b.py");
    }

    #[test]
    fn test_diff_prefix_with_schemes() {
        let parsed =
            CompoundLocator::parse_with("diff://git://a.py@HEAD~1:a.py", |_| true).unwrap();
        assert_eq!(parsed.left.scheme(), "git");
        assert!(parsed.right.is_file());
    }
}

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use http::Method;

use crate::error::PatternError;
use crate::path::{clean_path, decode_segment, next_segment};

/// The HTTP methods a pattern may name.
const METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

/// One piece of a pattern's path.
///
/// The parser canonicalises the two special endings: a pattern with a
/// trailing slash gets an anonymous `Multi` appended, and `{$}` becomes a
/// final `Literal` holding `"/"`. Every downstream algorithm can then treat
/// the final segment uniformly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Segment {
    /// Matches exactly this path component. The end anchor `{$}` is stored
    /// as the literal `"/"`.
    Literal(String),
    /// `{name}`: matches exactly one non-empty path component.
    Wild(String),
    /// `{name...}` or a trailing slash: matches the remainder of the path.
    /// The name is empty for the trailing-slash form.
    Multi(String),
}

impl Segment {
    pub(crate) fn is_multi(&self) -> bool {
        matches!(self, Segment::Multi(_))
    }

    /// The wildcard name under which a match is captured, if any.
    /// Anonymous trailing-slash multis and literals capture nothing.
    pub(crate) fn capture_name(&self) -> Option<&str> {
        match self {
            Segment::Wild(name) => Some(name),
            Segment::Multi(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// A parsed routing pattern: optional method, optional host, and a path
/// made of literal and wildcard segments.
///
/// The surface syntax is `[METHOD ][HOST]/[PATH]`, where each path segment
/// is a literal, `{name}`, `{name...}` (final segment only), or `{$}`
/// (final segment only). See [`Pattern::parse`].
#[derive(Clone, Debug)]
pub struct Pattern {
    method: Option<Method>,
    host: String,
    segments: Vec<Segment>,
    /// Source location of the registration, for conflict diagnostics.
    pub(crate) loc: String,
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        // Registration location is diagnostic metadata, not identity.
        self.method == other.method && self.host == other.host && self.segments == other.segments
    }
}

impl Eq for Pattern {}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// ```
    /// use servemux::Pattern;
    ///
    /// let pat = Pattern::parse("GET example.com/item/{user}")?;
    /// assert_eq!(pat.to_string(), "GET example.com/item/{user}");
    /// assert!(pat.matches("GET", "example.com", "/item/jba").is_some());
    /// # Ok::<(), servemux::PatternError>(())
    /// ```
    pub fn parse(s: &str) -> Result<Pattern, PatternError> {
        if s.is_empty() {
            return Err(PatternError::Empty);
        }

        let (method_str, rest) = match s.split_once(' ') {
            Some((method, rest)) => (method, rest),
            None => ("", s),
        };
        let method = if method_str.is_empty() {
            None
        } else {
            Some(
                known_method(method_str)
                    .ok_or_else(|| PatternError::BadMethod(method_str.to_string()))?,
            )
        };

        let slash = rest.find('/').ok_or(PatternError::MissingSlash)?;
        let host = &rest[..slash];
        if host.contains('{') {
            return Err(PatternError::BraceInHost);
        }
        let path = &rest[slash..];

        let mut segments = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut rest = path;
        while !rest.is_empty() {
            // Invariant: rest starts with '/'.
            rest = &rest[1..];
            if rest.is_empty() {
                // Trailing slash: matches any remaining path.
                segments.push(Segment::Multi(String::new()));
                break;
            }
            let i = rest.find('/').unwrap_or(rest.len());
            let seg = &rest[..i];
            rest = &rest[i..];
            if seg.is_empty() {
                return Err(PatternError::EmptySegment);
            }
            if !seg.contains('{') {
                segments.push(Segment::Literal(seg.to_string()));
                continue;
            }
            if !seg.starts_with('{') || !seg.ends_with('}') {
                return Err(PatternError::BadWildcardSegment);
            }
            let name = &seg[1..seg.len() - 1];
            if name == "$" {
                if !rest.is_empty() {
                    return Err(PatternError::DollarNotAtEnd);
                }
                segments.push(Segment::Literal("/".to_string()));
                break;
            }
            let (name, multi) = match name.strip_suffix("...") {
                Some(name) => (name, true),
                None => (name, false),
            };
            if multi && !rest.is_empty() {
                return Err(PatternError::MultiNotAtEnd);
            }
            if name.is_empty() {
                return Err(PatternError::EmptyWildcard);
            }
            if !is_valid_wildcard_name(name) {
                return Err(PatternError::BadWildcardName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(PatternError::DuplicateWildcardName(name.to_string()));
            }
            segments.push(if multi {
                Segment::Multi(name.to_string())
            } else {
                Segment::Wild(name.to_string())
            });
        }

        // Request paths are cleaned before matching, so a pattern with an
        // unclean path could never match. CONNECT requests are exempt from
        // cleaning and so are CONNECT patterns.
        if let Some(method) = &method {
            if *method != Method::CONNECT && path != clean_path(path) {
                return Err(PatternError::UncleanPath);
            }
        }

        Ok(Pattern {
            method,
            host: host.to_string(),
            segments,
            loc: String::new(),
        })
    }

    /// The method this pattern is restricted to, if any.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The host this pattern is restricted to; empty if unrestricted.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The method as a tree key: `""` when the pattern is method-less.
    pub(crate) fn method_key(&self) -> &str {
        self.method.as_ref().map_or("", |m| m.as_str())
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn last_segment(&self) -> &Segment {
        // The parser always produces at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    /// Reports whether this pattern matches the request triple, and if so
    /// returns the captured wildcard values in the order the wildcards
    /// appear in the pattern.
    ///
    /// A single wildcard matches one non-empty path component; a multi
    /// wildcard matches the (possibly empty) remainder after its slash; the
    /// end anchor matches the empty tail after a final slash. Captures are
    /// percent-decoded, falling back to the raw text if decoding fails.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not start with `/`.
    pub fn matches(&self, method: &str, host: &str, path: &str) -> Option<Vec<String>> {
        if !path.starts_with('/') {
            panic!("path must begin with '/' in path '{}'", path);
        }
        if let Some(m) = &self.method {
            if m.as_str() != method {
                return None;
            }
        }
        if !self.host.is_empty() && self.host != host {
            return None;
        }

        let mut rest = path;
        let mut values = Vec::new();
        for seg in &self.segments {
            match seg {
                Segment::Multi(name) => {
                    // The multi consumes the slash before it, so a bare
                    // "/foo" cannot match "/foo/{rest...}".
                    if rest.is_empty() {
                        return None;
                    }
                    if !name.is_empty() {
                        values.push(decode_segment(&rest[1..]));
                    }
                    rest = "";
                }
                seg => {
                    if rest.is_empty() {
                        return None;
                    }
                    let (head, tail) = next_segment(rest);
                    match seg {
                        Segment::Literal(lit) => {
                            if head != lit {
                                return None;
                            }
                        }
                        Segment::Wild(_) => {
                            if head == "/" {
                                return None;
                            }
                            values.push(decode_segment(head));
                        }
                        Segment::Multi(_) => unreachable!(),
                    }
                    rest = tail;
                }
            }
        }
        if !rest.is_empty() {
            return None;
        }
        Some(values)
    }

    /// Maps captured values back to their wildcard names.
    /// `values` is in the order the capturing wildcards appear.
    pub fn bind(&self, values: &[String]) -> HashMap<String, String> {
        let mut bindings = HashMap::new();
        let mut i = 0;
        for seg in &self.segments {
            if let Some(name) = seg.capture_name() {
                if let Some(value) = values.get(i) {
                    bindings.insert(name.to_string(), value.clone());
                }
                i += 1;
            }
        }
        bindings
    }
}

impl fmt::Display for Pattern {
    /// Writes the canonical form of the pattern. Parsing the result yields
    /// an equal pattern.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(method) = &self.method {
            write!(f, "{} ", method)?;
        }
        f.write_str(&self.host)?;
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) if s == "/" => f.write_str("/{$}")?,
                Segment::Literal(s) => write!(f, "/{}", s)?,
                Segment::Wild(name) => write!(f, "/{{{}}}", name)?,
                Segment::Multi(name) if name.is_empty() => f.write_str("/")?,
                Segment::Multi(name) => write!(f, "/{{{}...}}", name)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

fn known_method(s: &str) -> Option<Method> {
    METHODS.into_iter().find(|m| m.as_str() == s)
}

fn is_valid_wildcard_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .enumerate()
            .all(|(i, c)| c.is_alphabetic() || c == '_' || (i > 0 && c.is_numeric()))
}

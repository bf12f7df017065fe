use std::fmt;

/// Represents the ways a routing pattern can fail to parse.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatternError {
    /// The pattern string was empty.
    Empty,
    /// The method is not one of the known HTTP methods.
    BadMethod(String),
    /// The host/path part contains no `/`.
    MissingSlash,
    /// The host contains a `{`, which usually means the initial `/` is missing.
    BraceInHost,
    /// A path segment between two slashes is empty.
    EmptySegment,
    /// A `{` or `}` does not span an entire segment.
    BadWildcardSegment,
    /// A wildcard with no name, `{}` or `{...}`.
    EmptyWildcard,
    /// A wildcard name that is not a valid identifier.
    BadWildcardName(String),
    /// The same wildcard name is used twice in one pattern.
    DuplicateWildcardName(String),
    /// `{$}` somewhere other than the final segment.
    DollarNotAtEnd,
    /// A `{name...}` wildcard somewhere other than the final segment.
    MultiNotAtEnd,
    /// A pattern with a non-CONNECT method whose path is not in canonical
    /// form. Request paths are cleaned before matching, so such a pattern
    /// could never match anything.
    UncleanPath,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty pattern"),
            Self::BadMethod(m) => write!(f, "bad method {:?}", m),
            Self::MissingSlash => write!(f, "host/path missing /"),
            Self::BraceInHost => write!(f, "host contains '{{' (missing initial '/'?)"),
            Self::EmptySegment => write!(f, "empty path segment"),
            Self::BadWildcardSegment => {
                write!(f, "bad wildcard segment (must span an entire segment)")
            }
            Self::EmptyWildcard => write!(f, "empty wildcard"),
            Self::BadWildcardName(name) => write!(f, "bad wildcard name {:?}", name),
            Self::DuplicateWildcardName(name) => {
                write!(f, "duplicate wildcard name {:?}", name)
            }
            Self::DollarNotAtEnd => write!(f, "{{$}} not at end"),
            Self::MultiNotAtEnd => write!(f, "{{...}} wildcard not at end"),
            Self::UncleanPath => {
                write!(f, "non-CONNECT pattern with unclean path can never match")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Represents errors that can occur when registering a pattern.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum RegisterError {
    /// The pattern text did not parse.
    Pattern(PatternError),
    /// The new pattern conflicts with a previously registered one: some
    /// request would match both, and neither takes precedence.
    Conflict {
        /// Canonical text of the pattern being registered.
        pattern: String,
        /// Source location where registration was attempted.
        location: String,
        /// Canonical text of the already registered pattern.
        existing: String,
        /// Source location of the existing registration.
        existing_location: String,
        /// Human-readable description of how the two patterns relate.
        description: String,
    },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(err) => err.fmt(f),
            Self::Conflict {
                pattern,
                location,
                existing,
                existing_location,
                description,
            } => write!(
                f,
                "pattern {:?} (registered at {}) conflicts with pattern {:?} (registered at {}):\n{}",
                pattern, location, existing, existing_location, description
            ),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(err) => Some(err),
            Self::Conflict { .. } => None,
        }
    }
}

impl From<PatternError> for RegisterError {
    fn from(err: PatternError) -> Self {
        Self::Pattern(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_original_wording() {
        assert_eq!(PatternError::Empty.to_string(), "empty pattern");
        assert_eq!(
            PatternError::BadMethod("MOOSE".to_string()).to_string(),
            "bad method \"MOOSE\""
        );
        assert_eq!(PatternError::MissingSlash.to_string(), "host/path missing /");
        assert_eq!(PatternError::DollarNotAtEnd.to_string(), "{$} not at end");
        assert_eq!(
            PatternError::MultiNotAtEnd.to_string(),
            "{...} wildcard not at end"
        );
    }
}

use percent_encoding::percent_decode_str;

/// Returns the canonical form of an URL path: a leading slash is added if
/// missing, `.` and empty segments are dropped, `..` consumes the segment
/// before it, and a trailing slash is kept unless the whole path collapses
/// to `/`.
pub(crate) fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let trailing = p.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for seg in p.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            seg => segments.push(seg),
        }
    }

    let mut cleaned = String::with_capacity(p.len() + 1);
    for seg in &segments {
        cleaned.push('/');
        cleaned.push_str(seg);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    } else if trailing {
        cleaned.push('/');
    }
    cleaned
}

/// Fast pre-check for `clean_path`: a path that starts with `/` and never
/// contains `//` or `/.` is already canonical.
pub(crate) fn might_need_cleaning(p: &str) -> bool {
    if !p.starts_with('/') {
        return true;
    }
    let bytes = p.as_bytes();
    for pair in bytes.windows(2) {
        if pair[0] == b'/' && (pair[1] == b'/' || pair[1] == b'.') {
            return true;
        }
    }
    false
}

/// Splits off the first segment of a path that starts with `/`.
/// Returns `("/", "")` for a lone trailing slash; the remainder keeps its
/// leading slash.
pub(crate) fn next_segment(path: &str) -> (&str, &str) {
    if path == "/" {
        return ("/", "");
    }
    let path = &path[1..];
    match path.find('/') {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    }
}

/// Percent-decodes a captured path value. If the bytes do not decode to
/// valid UTF-8 the raw value is used instead.
pub(crate) fn decode_segment(s: &str) -> String {
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

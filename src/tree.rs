//! The decision tree used to match requests to patterns.
//!
//! The first level of the tree is keyed by host, the second by method, and
//! the remaining levels by path segment. Three child keys are reserved:
//! `"/"` for the end anchor, `""` for a single wildcard (also reachable
//! through the `empty_child` pointer), and `"*"` for a multi wildcard.
//! The order in which children are tried encodes precedence: literal over
//! single wildcard over multi wildcard, exact method over the GET fallback
//! for HEAD over method-less, host-bound over host-less.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::mapping::Mapping;
use crate::path::{decode_segment, next_segment};
use crate::pattern::{Pattern, Segment};

/// A node in the decision tree. The same struct serves for interior nodes
/// and leaves; a leaf holds the pattern and the handler it was registered
/// with.
pub(crate) struct Node<H> {
    pattern: Option<Arc<Pattern>>,
    handler: Option<Arc<H>>,
    children: Mapping<String, Node<H>>,
    /// Fast path for the `""` child, which every single wildcard uses.
    empty_child: Option<Box<Node<H>>>,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Node {
            pattern: None,
            handler: None,
            children: Mapping::default(),
            empty_child: None,
        }
    }
}

impl<H> Node<H> {
    pub(crate) fn new() -> Self {
        Node::default()
    }

    pub(crate) fn pattern(&self) -> Option<&Arc<Pattern>> {
        self.pattern.as_ref()
    }

    pub(crate) fn handler(&self) -> Option<&Arc<H>> {
        self.handler.as_ref()
    }

    /// Adds a pattern and its handler to the tree rooted at `self`.
    ///
    /// # Panics
    ///
    /// Panics if a pattern was already registered at the same leaf, or if
    /// two multi wildcards land on the same interior node. Conflict
    /// detection runs before insertion, so neither can happen through
    /// [`crate::Mux::register`].
    pub(crate) fn add_pattern(&mut self, pattern: Arc<Pattern>, handler: Arc<H>) {
        // First level of the tree is the host, second the method.
        let node = self.add_child(pattern.host());
        let node = node.add_child(pattern.method_key());
        node.add_segments(pattern.segments(), &pattern, handler);
    }

    fn add_segments(&mut self, segs: &[Segment], pattern: &Arc<Pattern>, handler: Arc<H>) {
        let Some((seg, rest)) = segs.split_first() else {
            self.set_leaf(pattern, handler);
            return;
        };
        match seg {
            Segment::Multi(_) => {
                if !rest.is_empty() {
                    panic!("multi wildcard not last in pattern '{}'", pattern);
                }
                if self.find_child("*").is_some() {
                    panic!("duplicate multi wildcard in pattern '{}'", pattern);
                }
                self.add_child("*").set_leaf(pattern, handler);
            }
            Segment::Wild(_) => self.add_child("").add_segments(rest, pattern, handler),
            Segment::Literal(lit) => self.add_child(lit).add_segments(rest, pattern, handler),
        }
    }

    fn set_leaf(&mut self, pattern: &Arc<Pattern>, handler: Arc<H>) {
        if self.pattern.is_some() || self.handler.is_some() {
            panic!("pattern '{}' registered twice", pattern);
        }
        self.pattern = Some(pattern.clone());
        self.handler = Some(handler);
    }

    fn add_child(&mut self, key: &str) -> &mut Node<H> {
        if key.is_empty() {
            return self.empty_child.get_or_insert_with(|| Box::new(Node::new()));
        }
        self.children.find_or_insert(key.to_string(), Node::new)
    }

    fn find_child(&self, key: &str) -> Option<&Node<H>> {
        self.children.find(key)
    }

    /// Finds the leaf matching the request triple, together with the
    /// decoded values for the pattern's wildcards in order of appearance.
    ///
    /// A pattern with the request's host is preferred over a host-less
    /// one; within a host, an exact method match is preferred, HEAD falls
    /// back to GET, and method-less patterns match any method.
    pub(crate) fn match_route(
        &self,
        method: &str,
        host: &str,
        path: &str,
    ) -> Option<(&Node<H>, Vec<String>)> {
        if !host.is_empty() {
            if let Some(host_node) = self.find_child(host) {
                let mut matches = Vec::new();
                if let Some(n) = host_node.match_method_and_path(method, path, &mut matches) {
                    return Some((n, matches));
                }
            }
        }
        let mut matches = Vec::new();
        let n = self
            .empty_child
            .as_deref()?
            .match_method_and_path(method, path, &mut matches)?;
        Some((n, matches))
    }

    fn match_method_and_path<'n>(
        &'n self,
        method: &str,
        path: &str,
        matches: &mut Vec<String>,
    ) -> Option<&'n Node<H>> {
        if let Some(c) = self.find_child(method) {
            if let Some(n) = c.match_path(path, matches) {
                return Some(n);
            }
        }
        if method == "HEAD" {
            // GET handles HEAD too.
            if let Some(c) = self.find_child("GET") {
                if let Some(n) = c.match_path(path, matches) {
                    return Some(n);
                }
            }
        }
        self.empty_child.as_deref()?.match_path(path, matches)
    }

    fn match_path<'n>(&'n self, path: &str, matches: &mut Vec<String>) -> Option<&'n Node<H>> {
        // An exhausted path matches the node itself, if it is a leaf.
        if path.is_empty() {
            return if self.pattern.is_some() { Some(self) } else { None };
        }
        let (seg, rest) = next_segment(path);
        if let Some(c) = self.find_child(seg) {
            if let Some(n) = c.match_path(rest, matches) {
                return Some(n);
            }
        }
        // A single wildcard matches any one component, but not the empty
        // tail after a trailing slash.
        if seg != "/" {
            if let Some(c) = self.empty_child.as_deref() {
                matches.push(decode_segment(seg));
                if let Some(n) = c.match_path(rest, matches) {
                    return Some(n);
                }
                matches.pop();
            }
        }
        if let Some(c) = self.find_child("*") {
            if let Some(pattern) = &c.pattern {
                // An anonymous multi (from a trailing slash in the
                // pattern) captures nothing.
                if pattern.last_segment().capture_name().is_some() {
                    matches.push(decode_segment(&path[1..]));
                }
                return Some(c);
            }
        }
        None
    }

    /// Collects every method that would produce a match for this host and
    /// path. Used for Method Not Allowed responses, so it is only called
    /// once matching has already failed; the method-less child is skipped
    /// because it would have matched.
    pub(crate) fn matching_methods(&self, host: &str, path: &str, methods: &mut BTreeSet<String>) {
        if !host.is_empty() {
            if let Some(c) = self.find_child(host) {
                c.matching_methods_path(path, methods);
            }
        }
        if let Some(c) = self.empty_child.as_deref() {
            c.matching_methods_path(path, methods);
        }
        if methods.contains("GET") {
            methods.insert("HEAD".to_string());
        }
    }

    fn matching_methods_path(&self, path: &str, methods: &mut BTreeSet<String>) {
        self.children.pairs(|method, c| {
            let mut matches = Vec::new();
            if c.match_path(path, &mut matches).is_some() {
                methods.insert(method.clone());
            }
            true
        });
    }

    #[cfg(test)]
    fn print(&self, out: &mut String, level: usize) {
        use std::fmt::Write;

        let indent = "    ".repeat(level);
        match &self.pattern {
            Some(p) => writeln!(out, "{}{:?}", indent, p.to_string()).unwrap(),
            None => writeln!(out, "{}nil", indent).unwrap(),
        }
        if let Some(c) = &self.empty_child {
            writeln!(out, "{}\"\":", indent).unwrap();
            c.print(out, level + 1);
        }
        let mut keys = self.children.keys();
        keys.sort();
        for key in keys {
            writeln!(out, "{}{:?}:", indent, key).unwrap();
            self.find_child(key).unwrap().print(out, level + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tree(pats: &[&str]) -> Node<String> {
        let mut root = Node::new();
        for p in pats {
            let pattern = Arc::new(Pattern::parse(p).unwrap());
            root.add_pattern(pattern, Arc::new(p.to_string()));
        }
        root
    }

    fn test_tree() -> Node<String> {
        build_tree(&[
            "/a",
            "/a/b",
            "/a/{x}",
            "/g/h/i",
            "/g/{x}/j",
            "/a/b/{x...}",
            "/a/b/{y}",
            "/a/b/{$}",
        ])
    }

    #[test]
    fn test_add_pattern() {
        let want = r#"nil
"":
    nil
    "":
        nil
        "a":
            "/a"
            "":
                "/a/{x}"
            "b":
                "/a/b"
                "":
                    "/a/b/{y}"
                "*":
                    "/a/b/{x...}"
                "/":
                    "/a/b/{$}"
        "g":
            nil
            "":
                nil
                "j":
                    "/g/{x}/j"
            "h":
                nil
                "i":
                    "/g/h/i"
"#;

        let mut got = String::new();
        test_tree().print(&mut got, 0);
        assert_eq!(got, want);
    }

    fn check_matches(tree: &Node<String>, cases: &[(&str, &str, &str, &str, &[&str])]) {
        for (method, host, path, want_pat, want_matches) in cases {
            let got = tree.match_route(method, host, path);
            match got {
                Some((node, matches)) => {
                    let pat = node.pattern().unwrap().to_string();
                    assert_eq!(&pat, want_pat, "{} {} {}", method, host, path);
                    assert_eq!(
                        matches,
                        want_matches
                            .iter()
                            .map(|s| s.to_string())
                            .collect::<Vec<_>>(),
                        "{} {} {}",
                        method,
                        host,
                        path
                    );
                }
                None => assert_eq!(
                    *want_pat, "",
                    "{} {} {}: expected match",
                    method, host, path
                ),
            }
        }
    }

    #[test]
    fn test_node_match() {
        check_matches(
            &test_tree(),
            &[
                ("GET", "", "/a", "/a", &[]),
                ("GET", "", "/b", "", &[]),
                ("GET", "", "/a/b", "/a/b", &[]),
                ("GET", "", "/a/c", "/a/{x}", &["c"]),
                ("GET", "", "/a/b/", "/a/b/{$}", &[]),
                ("GET", "", "/a/b/c", "/a/b/{y}", &["c"]),
                ("GET", "", "/a/b/c/d", "/a/b/{x...}", &["c/d"]),
                ("GET", "", "/g/h/i", "/g/h/i", &[]),
                ("GET", "", "/g/h/j", "/g/{x}/j", &["h"]),
            ],
        );
    }

    #[test]
    fn test_node_match_methods_and_hosts() {
        let tree = build_tree(&[
            "/item/",
            "POST /item/{user}",
            "GET /item/{user}",
            "/item/{user}",
            "/item/{user}/{id}",
            "/item/{user}/new",
            "/item/{$}",
            "POST alt.com/item/{user}",
            "GET /headwins",
            "HEAD /headwins",
            "/path/{p...}",
        ]);
        check_matches(
            &tree,
            &[
                // An exact method match beats the HEAD-uses-GET fallback.
                ("HEAD", "", "/headwins", "HEAD /headwins", &[]),
                // HEAD falls back to GET.
                ("HEAD", "", "/item/jba", "GET /item/{user}", &["jba"]),
                // The host subtree requires POST, so the host-less GET
                // pattern wins.
                ("GET", "alt.com", "/item/jba", "GET /item/{user}", &["jba"]),
                (
                    "POST",
                    "alt.com",
                    "/item/jba",
                    "POST alt.com/item/{user}",
                    &["jba"],
                ),
                ("PUT", "", "/item/jba", "/item/{user}", &["jba"]),
                ("GET", "", "/item/jba/17", "/item/{user}/{id}", &["jba", "17"]),
                ("GET", "", "/item/jba/new", "/item/{user}/new", &["jba"]),
                ("GET", "", "/item/", "/item/{$}", &[]),
                ("GET", "", "/item/jba/17/line2", "/item/", &[]),
                ("GET", "", "/item", "", &[]),
                ("GET", "", "/path/to/file", "/path/{p...}", &["to/file"]),
            ],
        );
    }

    #[test]
    fn test_capture_decoding() {
        let tree = build_tree(&["/{name}/{rest...}"]);
        check_matches(
            &tree,
            &[(
                "GET",
                "",
                "/%2Fjohn/a%20b/c",
                "/{name}/{rest...}",
                &["/john", "a b/c"],
            )],
        );
    }

    #[test]
    fn test_matching_methods() {
        let tree = build_tree(&[
            "GET /g",
            "POST /p",
            "GET /both",
            "POST /both",
            "TRACE h.com/t",
        ]);

        let mut methods = BTreeSet::new();
        tree.matching_methods("", "/both", &mut methods);
        let got: Vec<&str> = methods.iter().map(String::as_str).collect();
        // A GET match implies HEAD is allowed.
        assert_eq!(got, vec!["GET", "HEAD", "POST"]);

        let mut methods = BTreeSet::new();
        tree.matching_methods("", "/p", &mut methods);
        let got: Vec<&str> = methods.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["POST"]);

        let mut methods = BTreeSet::new();
        tree.matching_methods("h.com", "/t", &mut methods);
        let got: Vec<&str> = methods.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["TRACE"]);

        let mut methods = BTreeSet::new();
        tree.matching_methods("", "/missing", &mut methods);
        assert!(methods.is_empty());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_leaf_panics() {
        build_tree(&["/a/b", "/a/b"]);
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::RegisterError;
use crate::pattern::Pattern;
use crate::relation::describe;

/// A set of non-conflicting patterns with linear-scan matching.
///
/// This is the reference matcher: every registered pattern is tried
/// against the request and the highest-precedence match wins. [`crate::Mux`]
/// answers the same queries through its decision tree; the two agree on
/// every request.
#[derive(Default)]
pub struct PatternSet {
    patterns: Mutex<Vec<Arc<Pattern>>>,
}

impl PatternSet {
    pub fn new() -> Self {
        PatternSet::default()
    }

    /// Adds a pattern to the set. Fails if the pattern conflicts with one
    /// already present.
    pub fn register(&self, pattern: Pattern) -> Result<(), RegisterError> {
        let mut patterns = lock(&self.patterns);
        for existing in patterns.iter() {
            if pattern.conflicts_with(existing) {
                return Err(RegisterError::Conflict {
                    pattern: pattern.to_string(),
                    location: pattern.loc.clone(),
                    existing: existing.to_string(),
                    existing_location: existing.loc.clone(),
                    description: describe(&pattern, existing),
                });
            }
        }
        patterns.push(Arc::new(pattern));
        Ok(())
    }

    /// Matches the request triple against the set, returning the
    /// highest-precedence matching pattern and a map from wildcard names
    /// to decoded path values.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not start with `/`.
    pub fn match_request(
        &self,
        method: &str,
        host: &str,
        path: &str,
    ) -> Option<(Arc<Pattern>, HashMap<String, String>)> {
        let patterns = lock(&self.patterns);
        let mut best: Option<(&Arc<Pattern>, Vec<String>)> = None;
        for pattern in patterns.iter() {
            if let Some(values) = pattern.matches(method, host, path) {
                match &best {
                    Some((b, _)) if !pattern.higher_precedence(b) => {}
                    _ => best = Some((pattern, values)),
                }
            }
        }
        let (pattern, values) = best?;
        let bindings = pattern.bind(&values);
        Some((pattern.clone(), bindings))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_set(pats: &[&str]) -> PatternSet {
        let set = PatternSet::new();
        for p in pats {
            set.register(Pattern::parse(p).unwrap())
                .unwrap_or_else(|err| panic!("{:?}: {}", p, err));
        }
        set
    }

    #[test]
    fn test_pattern_set_match() {
        let set = build_set(&[
            "/item/",
            "POST /item/{user}",
            "/item/{user}",
            "/item/{user}/{id}",
            "/item/{user}/new",
            "/item/{$}",
            "POST alt.com/item/{userp}",
            "/path/{p...}",
        ]);

        // (method, host, path, want); None means no match, an empty map a
        // match without bindings.
        let tests: Vec<(&str, &str, &str, Option<Vec<(&str, &str)>>)> = vec![
            ("GET", "", "/item/jba", Some(vec![("user", "jba")])),
            (
                "POST",
                "",
                "/item/jba/17",
                Some(vec![("user", "jba"), ("id", "17")]),
            ),
            ("GET", "", "/item/jba/new", Some(vec![("user", "jba")])),
            ("GET", "", "/item/", Some(vec![])),
            ("GET", "", "/item/jba/17/line2", Some(vec![])),
            ("POST", "alt.com", "/item/jba", Some(vec![("userp", "jba")])),
            ("GET", "alt.com", "/item/jba", Some(vec![("user", "jba")])),
            ("GET", "", "/item", None),
            ("GET", "", "/path/to/file", Some(vec![("p", "to/file")])),
        ];

        for (method, mut host, path, want) in tests {
            if host.is_empty() {
                host = "example.com";
            }
            let got = set.match_request(method, host, path);
            match want {
                None => assert!(got.is_none(), "{} {} {}", method, host, path),
                Some(want) => {
                    let (_, bindings) = got.unwrap_or_else(|| {
                        panic!("{} {} {}: expected a match", method, host, path)
                    });
                    let want: HashMap<String, String> = want
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();
                    assert_eq!(bindings, want, "{} {} {}", method, host, path);
                }
            }
        }
    }

    #[test]
    fn test_register_conflict() {
        let set = build_set(&["/a/{x}"]);
        let err = set
            .register(Pattern::parse("/{x}/b").unwrap())
            .expect_err("conflicting pattern accepted");
        let msg = err.to_string();
        assert!(msg.contains("conflicts with"), "{}", msg);
        assert!(msg.contains("/a/{x}"), "{}", msg);

        // Equivalent patterns conflict too.
        let set = build_set(&["/a/{x}/"]);
        assert!(set
            .register(Pattern::parse("/a/{y}/{z...}").unwrap())
            .is_err());

        // A more specific pattern does not conflict.
        let set = build_set(&["/{x}"]);
        assert!(set.register(Pattern::parse("/a/{y}").unwrap()).is_ok());
    }
}

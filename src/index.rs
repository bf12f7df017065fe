//! An index that narrows the set of patterns a new registration has to be
//! checked against for conflicts.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pattern::{Pattern, Segment};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct IndexKey {
    /// 0-based segment position.
    pos: usize,
    /// Literal text, `"/"` for the end anchor, or empty for a single
    /// wildcard.
    s: String,
}

/// Inverted lists of registered patterns, keyed by (position, segment).
/// Patterns ending in a multi wildcard go in a separate list, since they
/// can overlap patterns of any length.
#[derive(Default)]
pub(crate) struct RoutingIndex {
    segments: HashMap<IndexKey, Vec<Arc<Pattern>>>,
    multis: Vec<Arc<Pattern>>,
}

impl RoutingIndex {
    pub(crate) fn new() -> Self {
        RoutingIndex::default()
    }

    pub(crate) fn add_pattern(&mut self, pattern: Arc<Pattern>) {
        if pattern.last_segment().is_multi() {
            self.multis.push(pattern);
            return;
        }
        for (pos, seg) in pattern.segments().iter().enumerate() {
            let s = match seg {
                Segment::Literal(lit) => lit.clone(),
                Segment::Wild(_) => String::new(),
                Segment::Multi(_) => unreachable!("multi not last"),
            };
            self.segments
                .entry(IndexKey { pos, s })
                .or_default()
                .push(pattern.clone());
        }
    }

    /// Calls `f` on a superset of the registered patterns that could
    /// conflict with `pattern`, stopping at the first error.
    ///
    /// Terminology: a dollar pattern ends in `{$}`, a multi pattern in a
    /// trailing slash or `{name...}`, and an ordinary pattern in neither.
    pub(crate) fn possibly_conflicting<E, F>(&self, pattern: &Pattern, mut f: F) -> Result<(), E>
    where
        F: FnMut(&Arc<Pattern>) -> Result<(), E>,
    {
        let segs = pattern.segments();

        if matches!(pattern.last_segment(), Segment::Literal(s) if s == "/") {
            // Every path a dollar pattern matches ends in a slash; no path
            // an ordinary pattern matches does. So a dollar pattern can
            // only conflict with other dollar patterns that anchor at the
            // same position, or with multis.
            if let Some(pats) = self.segments.get(&IndexKey {
                pos: segs.len() - 1,
                s: "/".to_string(),
            }) {
                apply(pats, &mut f)?;
            }
            return apply(&self.multis, &mut f);
        }

        // For ordinary patterns, the only conflicts can be with patterns
        // that have the same literal or a wildcard at some literal
        // position, or with a multi. Pick the literal position with the
        // fewest candidates.
        let mut best: Option<(&[Arc<Pattern>], &[Arc<Pattern>])> = None;
        let mut best_sum = usize::MAX;
        for (pos, seg) in segs.iter().enumerate() {
            if let Segment::Literal(lit) = seg {
                let lpats = self.lookup(pos, lit);
                let wpats = self.lookup(pos, "");
                let sum = lpats.len() + wpats.len();
                if sum < best_sum {
                    best = Some((lpats, wpats));
                    best_sum = sum;
                }
            }
        }
        match best {
            Some((lpats, wpats)) => {
                apply(lpats, &mut f)?;
                apply(wpats, &mut f)?;
            }
            None => {
                // All wildcards: the pattern can only conflict with a
                // multi or with an equal-length all-wildcard pattern.
                apply(self.lookup(segs.len() - 1, ""), &mut f)?;
            }
        }
        apply(&self.multis, &mut f)
    }

    fn lookup(&self, pos: usize, s: &str) -> &[Arc<Pattern>] {
        self.segments
            .get(&IndexKey {
                pos,
                s: s.to_string(),
            })
            .map_or(&[], Vec::as_slice)
    }
}

fn apply<E, F>(pats: &[Arc<Pattern>], f: &mut F) -> Result<(), E>
where
    F: FnMut(&Arc<Pattern>) -> Result<(), E>,
{
    for p in pats {
        f(p)?;
    }
    Ok(())
}

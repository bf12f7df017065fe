//! The relationship lattice between patterns.
//!
//! Any two patterns relate in exactly one of five ways, considering the
//! set of requests each matches: they match the same requests
//! (`Equivalent`), one matches a strict superset of the other
//! (`MoreGeneral` / `MoreSpecific`), they share some requests but neither
//! contains the other (`Overlaps`), or they share none (`Disjoint`).
//! Precedence and conflict detection are both derived from this lattice.

use std::fmt;

use crate::error::PatternError;
use crate::pattern::{Pattern, Segment};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Relation {
    Equivalent,
    MoreGeneral,
    MoreSpecific,
    Overlaps,
    Disjoint,
}

impl Relation {
    fn inverse(self) -> Relation {
        match self {
            Relation::MoreGeneral => Relation::MoreSpecific,
            Relation::MoreSpecific => Relation::MoreGeneral,
            rel => rel,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Equivalent => "equivalent",
            Relation::MoreGeneral => "moreGeneral",
            Relation::MoreSpecific => "moreSpecific",
            Relation::Overlaps => "overlaps",
            Relation::Disjoint => "disjoint",
        })
    }
}

/// Classifies the relationship of the paths of two patterns, ignoring
/// method and host.
///
/// The segment sequences are walked in lockstep. Two flags track whether a
/// single wildcard on either side has covered a literal on the other: a
/// side that did so can no longer be more specific than the other.
pub(crate) fn compare_paths(p1: &Pattern, p2: &Pattern) -> Relation {
    let segs1 = p1.segments();
    let segs2 = p2.segments();
    let mut wild1_covered_lit2 = false;
    let mut wild2_covered_lit1 = false;

    let (mut i, mut j) = (0, 0);
    while i < segs1.len() && j < segs2.len() {
        match (&segs1[i], &segs2[j]) {
            // Both multis match the entire remaining path; any difference
            // was found earlier.
            (Segment::Multi(_), Segment::Multi(_)) => {
                i += 1;
                j += 1;
            }
            // p1's multi matches everything p2's remaining segments do.
            (Segment::Multi(_), _) => {
                return if wild2_covered_lit1 {
                    Relation::Overlaps
                } else {
                    Relation::MoreGeneral
                };
            }
            (_, Segment::Multi(_)) => {
                return if wild1_covered_lit2 {
                    Relation::Overlaps
                } else {
                    Relation::MoreSpecific
                };
            }
            // Both end anchors: both paths end in the same trailing slash.
            (Segment::Literal(s1), Segment::Literal(s2)) if s1 == "/" && s2 == "/" => {
                i += 1;
                j += 1;
            }
            // An end anchor matches the empty tail, which neither a
            // literal nor a single wildcard can.
            (Segment::Literal(s1), _) if s1 == "/" => return Relation::Disjoint,
            (_, Segment::Literal(s2)) if s2 == "/" => return Relation::Disjoint,
            (Segment::Wild(_), Segment::Wild(_)) => {
                i += 1;
                j += 1;
            }
            (Segment::Wild(_), Segment::Literal(_)) => {
                wild1_covered_lit2 = true;
                i += 1;
                j += 1;
            }
            (Segment::Literal(_), Segment::Wild(_)) => {
                wild2_covered_lit1 = true;
                i += 1;
                j += 1;
            }
            (Segment::Literal(s1), Segment::Literal(s2)) => {
                if s1 != s2 {
                    return Relation::Disjoint;
                }
                i += 1;
                j += 1;
            }
        }
    }

    if i == segs1.len() && j == segs2.len() {
        return match (wild1_covered_lit2, wild2_covered_lit1) {
            (false, false) => Relation::Equivalent,
            (true, false) => Relation::MoreGeneral,
            (false, true) => Relation::MoreSpecific,
            (true, true) => Relation::Overlaps,
        };
    }
    // One pattern has segments left over and the other ended without a
    // multi (a multi would have been handled inside the loop), so the
    // longer one requires path components the shorter cannot match.
    Relation::Disjoint
}

/// Classifies the relationship of the methods of two patterns.
pub(crate) fn compare_methods(p1: &Pattern, p2: &Pattern) -> Relation {
    match (p1.method(), p2.method()) {
        (None, None) => Relation::Equivalent,
        (Some(m1), Some(m2)) if m1 == m2 => Relation::Equivalent,
        (None, Some(_)) => Relation::MoreGeneral,
        (Some(_), None) => Relation::MoreSpecific,
        (Some(_), Some(_)) => Relation::Disjoint,
    }
}

/// Combines the relationships of two orthogonal features (method and path)
/// into the relationship of the patterns as a whole.
pub(crate) fn combine(r1: Relation, r2: Relation) -> Relation {
    match r1 {
        Relation::Equivalent => r2,
        Relation::Disjoint => Relation::Disjoint,
        Relation::Overlaps => {
            if r2 == Relation::Disjoint {
                Relation::Disjoint
            } else {
                Relation::Overlaps
            }
        }
        Relation::MoreGeneral | Relation::MoreSpecific => match r2 {
            Relation::Equivalent => r1,
            r2 if r2 == r1.inverse() => Relation::Overlaps,
            r2 => r2,
        },
    }
}

impl Pattern {
    /// Reports whether `self` takes precedence over `other`: whenever a
    /// request matches both, `self` is chosen.
    ///
    /// Patterns with a host win over patterns without one; otherwise the
    /// combined method-and-path relationship must be strictly more
    /// specific.
    pub fn higher_precedence(&self, other: &Pattern) -> bool {
        if self.host().is_empty() != other.host().is_empty() {
            return !self.host().is_empty();
        }
        combine(compare_methods(self, other), compare_paths(self, other))
            == Relation::MoreSpecific
    }

    /// Reports whether `self` conflicts with `other`: some request matches
    /// both, yet neither takes precedence.
    pub fn conflicts_with(&self, other: &Pattern) -> bool {
        if self.host() != other.host() {
            // Either exactly one has a host, and that one wins by
            // precedence, or the hosts differ and no request matches both.
            return false;
        }
        let rel = combine(compare_methods(self, other), compare_paths(self, other));
        rel == Relation::Equivalent || rel == Relation::Overlaps
    }
}

/// Describes how the requests matched by `pat1` relate to those matched by
/// `pat2`, with example paths where they help.
pub fn describe_relationship(pat1: &str, pat2: &str) -> Result<String, PatternError> {
    let p1 = Pattern::parse(pat1)?;
    let p2 = Pattern::parse(pat2)?;
    Ok(describe(&p1, &p2))
}

pub(crate) fn describe(p1: &Pattern, p2: &Pattern) -> String {
    let mrel = compare_methods(p1, p2);
    let prel = compare_paths(p1, p2);
    match combine(mrel, prel) {
        Relation::Equivalent => format!("{} matches the same requests as {}", p1, p2),
        Relation::MoreGeneral => format!("{} matches more requests than {}", p1, p2),
        Relation::MoreSpecific => format!("{} matches fewer requests than {}", p1, p2),
        Relation::Disjoint => format!("{} and {} match no requests in common", p1, p2),
        Relation::Overlaps => {
            if prel == Relation::Overlaps {
                format!(
                    "{p1} and {p2} both match some paths, like {common:?}.\n\
                     But neither is more specific than the other.\n\
                     {p1} matches {diff1:?}, but {p2} doesn't.\n\
                     {p2} matches {diff2:?}, but {p1} doesn't.",
                    p1 = p1,
                    p2 = p2,
                    common = common_path(p1, p2),
                    diff1 = difference_path(p1, p2),
                    diff2 = difference_path(p2, p1),
                )
            } else if mrel == Relation::MoreGeneral && prel == Relation::MoreSpecific {
                format!(
                    "{} matches more methods than {}, but has a more specific path pattern",
                    p1, p2
                )
            } else {
                format!(
                    "{} matches fewer methods than {}, but has a more general path pattern",
                    p1, p2
                )
            }
        }
    }
}

fn write_segment(b: &mut String, seg: &Segment) {
    b.push('/');
    match seg {
        Segment::Literal(s) if s != "/" => b.push_str(s),
        // A wildcard's name doubles as a sample literal.
        Segment::Wild(name) => b.push_str(name),
        _ => {}
    }
}

fn write_matching_path(b: &mut String, segs: &[Segment]) {
    for seg in segs {
        write_segment(b, seg);
    }
}

/// Returns a sample literal path that both patterns match.
/// The patterns must not be disjoint.
pub(crate) fn common_path(p1: &Pattern, p2: &Pattern) -> String {
    let segs1 = p1.segments();
    let segs2 = p2.segments();
    let mut b = String::new();
    let n = segs1.len().min(segs2.len());
    for i in 0..n {
        // Substitute the other side's segment wherever this one is a
        // wildcard of either kind.
        if matches!(&segs1[i], Segment::Wild(_) | Segment::Multi(_)) {
            write_segment(&mut b, &segs2[i]);
        } else {
            write_segment(&mut b, &segs1[i]);
        }
    }
    if segs1.len() > n {
        write_matching_path(&mut b, &segs1[n..]);
    } else if segs2.len() > n {
        write_matching_path(&mut b, &segs2[n..]);
    }
    b
}

/// Returns a sample literal path that `p1` matches and `p2` does not.
/// Such a path must exist.
pub(crate) fn difference_path(p1: &Pattern, p2: &Pattern) -> String {
    let segs1 = p1.segments();
    let segs2 = p2.segments();
    let mut b = String::new();
    let n = segs1.len().min(segs2.len());
    for i in 0..n {
        let s1 = &segs1[i];
        let s2 = &segs2[i];
        match (s1, s2) {
            (Segment::Multi(_), Segment::Multi(_)) => {
                // From here on the patterns match the same paths, so a
                // difference must have been written already.
                b.push('/');
                return b;
            }
            (Segment::Multi(name), _) => {
                // s1 matches the rest of the path but s2 does not. A
                // trailing slash distinguishes them, unless s2 is the end
                // anchor, in which case any extra component will do.
                b.push('/');
                if matches!(s2, Segment::Literal(l) if l == "/") {
                    if name.is_empty() {
                        b.push('x');
                    } else {
                        b.push_str(name);
                    }
                }
                return b;
            }
            (_, Segment::Multi(_)) => write_segment(&mut b, s1),
            (Segment::Wild(_), Segment::Wild(_)) => {
                // Both match whatever goes here; use the first name.
                write_segment(&mut b, s1);
            }
            (Segment::Wild(name), Segment::Literal(lit)) => {
                // Any component other than the literal works. Prefer the
                // wildcard name; tweak the literal if they collide.
                if name != lit {
                    write_segment(&mut b, s1);
                } else {
                    b.push('/');
                    b.push_str(lit);
                    b.push('x');
                }
            }
            (Segment::Literal(_), Segment::Wild(_)) => write_segment(&mut b, s1),
            (Segment::Literal(l1), Segment::Literal(l2)) => {
                // The patterns overlap, so corresponding literals agree.
                if l1 != l2 {
                    panic!("difference_path: unequal literals {:?} and {:?}", l1, l2);
                }
                write_segment(&mut b, s1);
            }
        }
    }
    if segs1.len() > n {
        // p1 is longer and p2 does not end in a multi; anything matching
        // the rest of p1 will do.
        write_matching_path(&mut b, &segs1[n..]);
    } else if segs2.len() > n {
        write_matching_path(&mut b, &segs2[n..]);
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Pattern {
        Pattern::parse(s).unwrap()
    }

    #[test]
    fn test_compare_paths() {
        use Relation::*;
        let tests = vec![
            ("/a/{$}", "/a", Disjoint),
            ("/", "/a", MoreGeneral),
            ("/{x...}", "/a", MoreGeneral),
            ("/", "/{x}", MoreGeneral),
            ("/", "/{$}", MoreGeneral),
            ("/a/b/{x...}", "/a/b/c/d/{y...}", MoreGeneral),
            ("/a", "/a", Equivalent),
            ("/a", "/ab", Disjoint),
            ("/{x}", "/{x}", Equivalent),
            ("/a/{x...}", "/a/b/{x...}", MoreGeneral),
            ("/a/{$}", "/a/b/{x...}", Disjoint),
            ("/a/b/{$}", "/a/b/{x...}", MoreSpecific),
            ("/a/{x}/b/{y...}", "/{x}/c/{y...}", Overlaps),
            ("/a/{x}/b/", "/{x}/c/{y...}", Overlaps),
            ("/a/{x}/b/{$}", "/{x}/c/{y...}", Overlaps),
            ("/a/{x...}", "/b/{y...}", Disjoint),
            ("/a/{x...}", "/a/{y...}", Equivalent),
            ("/a/{z}/{x...}", "/a/b/{y...}", MoreGeneral),
            ("/a/{z}/{x...}", "/{z}/b/{y...}", Overlaps),
            ("/a/{x...}", "/a/{x}/{y...}", MoreGeneral),
            // A literal is more specific than anything it overlaps,
            // except itself.
            ("/a", "/b", Disjoint),
            ("/a", "/", MoreSpecific),
            ("/a", "/{$}", Disjoint),
            ("/a", "/{x}", MoreSpecific),
            ("/a", "/{x...}", MoreSpecific),
            // Adding a segment doesn't change that.
            ("/b/a", "/b/a", Equivalent),
            ("/b/a", "/b/b", Disjoint),
            ("/b/a", "/b/", MoreSpecific),
            ("/b/a", "/b/{$}", Disjoint),
            ("/b/a", "/b/{x}", MoreSpecific),
            ("/b/a", "/b/{x...}", MoreSpecific),
            ("/{z}/a", "/{z}/a", Equivalent),
            ("/{z}/a", "/{z}/b", Disjoint),
            ("/{z}/a", "/{z}/", MoreSpecific),
            ("/{z}/a", "/{z}/{$}", Disjoint),
            ("/{z}/a", "/{z}/{x}", MoreSpecific),
            ("/{z}/a", "/{z}/{x...}", MoreSpecific),
            // Single wildcard on the left.
            ("/{z}", "/a", MoreGeneral),
            ("/{z}", "/a/b", Disjoint),
            ("/{z}", "/{$}", Disjoint),
            ("/{z}", "/{x}", Equivalent),
            ("/{z}", "/", MoreSpecific),
            ("/{z}", "/{x...}", MoreSpecific),
            ("/b/{z}", "/b/a", MoreGeneral),
            ("/b/{z}", "/b/a/b", Disjoint),
            ("/b/{z}", "/b/{$}", Disjoint),
            ("/b/{z}", "/b/{x}", Equivalent),
            ("/b/{z}", "/b/", MoreSpecific),
            ("/b/{z}", "/b/{x...}", MoreSpecific),
            // Trailing slash on the left.
            ("/", "/a/b", MoreGeneral),
            ("/", "/", Equivalent),
            ("/", "/{x...}", Equivalent),
            ("/b/", "/b/a", MoreGeneral),
            ("/b/", "/b/a/b", MoreGeneral),
            ("/b/", "/b/{$}", MoreGeneral),
            ("/b/", "/b/{x}", MoreGeneral),
            ("/b/", "/b/", Equivalent),
            ("/b/", "/b/{x...}", Equivalent),
            ("/{z}/", "/{z}/a", MoreGeneral),
            ("/{z}/", "/{z}/a/b", MoreGeneral),
            ("/{z}/", "/{z}/{$}", MoreGeneral),
            ("/{z}/", "/{z}/{x}", MoreGeneral),
            ("/{z}/", "/{z}/", Equivalent),
            ("/{z}/", "/a/", MoreGeneral),
            ("/{z}/", "/{z}/{x...}", Equivalent),
            ("/{z}/", "/a/{x...}", MoreGeneral),
            ("/a/{z}/", "/{z}/a/", Overlaps),
            // Multi wildcard on the left.
            ("/{m...}", "/a/b", MoreGeneral),
            ("/{m...}", "/{$}", MoreGeneral),
            ("/{m...}", "/{x}", MoreGeneral),
            ("/{m...}", "/", Equivalent),
            ("/{m...}", "/{x...}", Equivalent),
            ("/b/{m...}", "/b/a", MoreGeneral),
            ("/b/{m...}", "/b/a/b", MoreGeneral),
            ("/b/{m...}", "/b/{$}", MoreGeneral),
            ("/b/{m...}", "/b/{x}", MoreGeneral),
            ("/b/{m...}", "/b/", Equivalent),
            ("/b/{m...}", "/b/{x...}", Equivalent),
            ("/{z}/{m...}", "/{z}/a", MoreGeneral),
            ("/{z}/{m...}", "/{z}/a/b", MoreGeneral),
            ("/{z}/{m...}", "/{z}/{$}", MoreGeneral),
            ("/{z}/{m...}", "/{z}/{x}", MoreGeneral),
            ("/{z}/{m...}", "/{z}/", Equivalent),
            ("/{z}/{m...}", "/a/", MoreGeneral),
            ("/{z}/{m...}", "/{z}/{x...}", Equivalent),
            ("/{z}/{m...}", "/a/{x...}", MoreGeneral),
            ("/a/{z}/{m...}", "/{z}/a/", Overlaps),
            // End anchor on the left.
            ("/{$}", "/a", Disjoint),
            ("/{$}", "/a/b", Disjoint),
            ("/{$}", "/{$}", Equivalent),
            ("/{$}", "/{x}", Disjoint),
            ("/{$}", "/", MoreSpecific),
            ("/{$}", "/{x...}", MoreSpecific),
            ("/b/{$}", "/b/a", Disjoint),
            ("/b/{$}", "/b/a/b", Disjoint),
            ("/b/{$}", "/b/{$}", Equivalent),
            ("/b/{$}", "/b/{x}", Disjoint),
            ("/b/{$}", "/b/", MoreSpecific),
            ("/b/{$}", "/b/{x...}", MoreSpecific),
            ("/{z}/{$}", "/{z}/a", Disjoint),
            ("/{z}/{$}", "/{z}/a/b", Disjoint),
            ("/{z}/{$}", "/{z}/{$}", Equivalent),
            ("/{z}/{$}", "/{z}/{x}", Disjoint),
            ("/{z}/{$}", "/{z}/", MoreSpecific),
            ("/{z}/{$}", "/a/", Overlaps),
            ("/{z}/{$}", "/a/{x...}", Overlaps),
            ("/{z}/{$}", "/{z}/{x...}", MoreSpecific),
            ("/a/{z}/{$}", "/{z}/a/", Overlaps),
        ];

        for (t1, t2, want) in tests {
            let p1 = parse(t1);
            let p2 = parse(t2);
            assert_eq!(
                compare_paths(&p1, &p1),
                Relation::Equivalent,
                "{} not equivalent to itself",
                p1
            );
            assert_eq!(
                compare_paths(&p2, &p2),
                Relation::Equivalent,
                "{} not equivalent to itself",
                p2
            );
            assert_eq!(compare_paths(&p1, &p2), want, "{} vs {}", t1, t2);
            // The relation is anti-symmetric.
            assert_eq!(
                compare_paths(&p2, &p1),
                want.inverse(),
                "{} vs {}",
                t2,
                t1
            );
        }
    }

    #[test]
    fn test_higher_precedence() {
        let tests = vec![
            // 1. Host wins.
            ("h/", "/", true),
            ("/", "h/", false),
            ("h/", "h/", false),
            // 2. More specific method and path wins.
            ("GET /", "/", true),
            ("/", "GET /", false),
            ("GET /", "POST /", false),
            ("/", "/", false),
            ("/a", "/", true),
            ("/", "/a", false),
            ("/a", "/a", false),
            ("/a/", "/a", false),
            ("/a", "/a/", false),
            ("/a", "/a/{x}", false),
            ("/a/{x}", "/a", false),
            ("/a/{x}", "/a/{x}", false),
            ("/a/{x...}", "/a/{x}", false),
            ("/a/{x}", "/a/{x...}", true),
            ("/a/bc", "/a/b", false),
            ("/a/b", "/a/bc", false),
            // 3. End anchor.
            ("/{$}", "/", true),
            ("/", "/{$}", false),
            ("/a/{x}/{$}", "/a/{x}/", true),
            ("/a/{x}/", "/a/{x}/{$}", false),
            ("/a/b/", "/a/{x}/{$}", false),
            ("/a/{x}/{$}", "/a/b/", false),
            ("/a/{$}", "/b/{$}", false),
            // A method combined with a more general path overlaps instead.
            ("GET /a/", "/a/b", false),
            ("/{x}/{y}", "/{x}/a", false),
        ];

        for (t1, t2, want) in tests {
            let p1 = parse(t1);
            let p2 = parse(t2);
            assert_eq!(
                p1.higher_precedence(&p2),
                want,
                "{:?}.higher_precedence({:?})",
                t1,
                t2
            );
        }
    }

    #[test]
    fn test_conflicts_with() {
        let tests = vec![
            ("/a", "/a", true),
            ("/a", "/ab", false),
            ("/a/b/cd", "/a/b/cd", true),
            ("/a/b/cd", "/a/b/c", false),
            ("/a/b/c", "/a/c/c", false),
            ("/{x}", "/{y}", true),
            ("/{x}", "/a", false),
            ("/{x}/{y}", "/{x}/a", false),
            ("/{x}/{y}", "/{x}/a/b", false),
            ("/{x}", "/a/{y}", false),
            ("/{x}/{y}", "/{x}/a/", false),
            ("/{x}", "/a/{y...}", false),
            ("/{x}/a/{y}", "/{x}/a/{y...}", false),
            ("/{x}/{y}", "/{x}/a/{$}", false),
            ("/{x}/{y}/{$}", "/{x}/a/{$}", false),
            ("/a/{x}", "/{x}/b", true),
            // Methods and hosts prune conflicts.
            ("GET /a", "POST /a", false),
            ("GET /a", "GET /a", true),
            ("GET /a", "/a", false),
            ("h/a", "/a", false),
            ("h/a", "g/a", false),
            ("h/a", "h/a", true),
            // Wildcard names don't matter, only structure.
            ("/a/{x}/", "/a/{y}/{z...}", true),
            ("/{x}", "/a/{y}", false),
        ];

        for (t1, t2, want) in tests {
            let p1 = parse(t1);
            let p2 = parse(t2);
            assert_eq!(p1.conflicts_with(&p2), want, "{:?} vs {:?}", t1, t2);
            // Conflict is commutative.
            assert_eq!(p2.conflicts_with(&p1), want, "{:?} vs {:?}", t2, t1);
        }
    }

    #[test]
    fn test_precedence_excludes_conflict() {
        let pats = [
            "/a", "/ab", "/a/b", "/a/{x}", "/a/{x...}", "/a/{$}", "/", "/{x}", "/{x...}",
            "GET /a", "POST /a", "GET /", "h/a", "/a/b/", "/a/b/{$}",
        ];
        for t1 in pats {
            for t2 in pats {
                let p1 = parse(t1);
                let p2 = parse(t2);
                if p1.higher_precedence(&p2) || p2.higher_precedence(&p1) {
                    assert!(!p1.conflicts_with(&p2), "{:?} vs {:?}", t1, t2);
                }
            }
        }
    }

    #[test]
    fn test_common_path() {
        let tests = vec![
            ("/a", "/a", "/a"),
            ("/{x}", "/{x}", "/x"),
            ("/{x}", "/a", "/a"),
            ("/{x}/b", "/a/{y}", "/a/b"),
            ("/", "/a", "/a"),
            ("/{x...}", "/a", "/a"),
            ("/", "/{x}", "/x"),
            ("/", "/{$}", "/"),
            ("/a/{x...}", "/a/b/{x...}", "/a/b/"),
            ("/a/b/{$}", "/a/b/{x...}", "/a/b/"),
            ("/a/b/{x...}", "/a/b/{$}", "/a/b/"),
            ("/a/{x}/b/{y...}", "/{x}/c/{y...}", "/a/c/b/"),
            ("/a/{x}/b/", "/{x}/c/{y...}", "/a/c/b/"),
            ("/a/{x}/b/{$}", "/{x}/c/{y...}", "/a/c/b/"),
        ];
        for (t1, t2, want) in tests {
            let p1 = parse(t1);
            let p2 = parse(t2);
            assert_eq!(common_path(&p1, &p2), want, "{:?} vs {:?}", t1, t2);
        }
    }

    #[test]
    fn test_difference_path() {
        // In each case p1 matches the expected path and p2 does not.
        let tests = vec![
            ("/a/{x}/b/{y...}", "/{x}/c/{y...}", "/a/x/b/"),
            ("/{x}/c/{y...}", "/a/{x}/b/{y...}", "/x/c/"),
            ("/a/{z}/", "/{z}/a/", "/a/z/"),
            ("/{z}/a/", "/a/{z}/", "/z/a/"),
            ("/a/", "/a/{$}", "/a/x"),
            ("/{z}/{m...}", "/{z}/{$}", "/z/m"),
        ];
        for (t1, t2, want) in tests {
            let p1 = parse(t1);
            let p2 = parse(t2);
            let got = difference_path(&p1, &p2);
            assert_eq!(got, want, "{:?} vs {:?}", t1, t2);
            assert!(
                p1.matches("", "", &got).is_some(),
                "{:?} should match {:?}",
                t1,
                got
            );
            assert!(
                p2.matches("", "", &got).is_none(),
                "{:?} should not match {:?}",
                t2,
                got
            );
        }
    }

    #[test]
    fn test_describe_relationship() {
        let desc = describe_relationship("/a/{x}", "/{x}/b").unwrap();
        assert!(desc.contains("both match some paths"), "{}", desc);
        assert!(desc.contains("neither is more specific"), "{}", desc);

        let desc = describe_relationship("/a/{x}/", "/a/{y}/{z...}").unwrap();
        assert!(desc.contains("matches the same requests as"), "{}", desc);

        let desc = describe_relationship("/a", "/b").unwrap();
        assert!(desc.contains("no requests in common"), "{}", desc);

        let desc = describe_relationship("GET /a/", "/a/b").unwrap();
        assert!(desc.contains("fewer methods"), "{}", desc);

        let desc = describe_relationship("/a/b", "GET /a/").unwrap();
        assert!(desc.contains("more methods"), "{}", desc);

        assert!(describe_relationship("{bad", "/").is_err());
    }
}

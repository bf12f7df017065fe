#![no_main]
use libfuzzer_sys::fuzz_target;
use servemux::{Mux, Pattern, PatternSet, RouteOutcome};
use std::fmt::Write;

// Decodes bytes into a pattern over a small alphabet: literals a/b/c,
// single wildcards, and one of the final-segment forms (literal, single
// wildcard, multi wildcard, end anchor).
fn pattern_from_bytes(bytes: &[u8]) -> Option<String> {
    let (&last, body) = bytes.split_last()?;
    let mut s = String::new();
    let mut wc = 0;
    for &b in body {
        s.push('/');
        match b & 0x3 {
            0 => {
                write!(s, "{{x{}}}", wc).unwrap();
                wc += 1;
            }
            1 => s.push('a'),
            2 => s.push('b'),
            _ => s.push('c'),
        }
    }
    s.push('/');
    match last & 0x7 {
        0 => write!(s, "{{x{}}}", wc).unwrap(),
        1 => s.push('a'),
        2 => s.push('b'),
        3 => s.push('c'),
        4 | 5 => write!(s, "{{x{}...}}", wc).unwrap(),
        _ => s.push_str("{$}"),
    }
    Some(s)
}

fn path_from_bytes(bytes: &[u8]) -> String {
    let mut s = String::new();
    for &b in bytes {
        s.push('/');
        s.push(match b & 0x3 {
            0 => 'a',
            1 => 'b',
            2 => 'c',
            _ => 'd',
        });
    }
    if s.is_empty() {
        return "/".to_string();
    }
    if bytes[0] & 0x8 != 0 {
        s.push('/');
    }
    s
}

fuzz_target!(|data: (Vec<Vec<u8>>, Vec<u8>)| {
    let (pattern_bytes, path_bytes) = data;

    let mux: Mux<usize> = Mux::new();
    let set = PatternSet::new();
    for (i, bs) in pattern_bytes.iter().take(16).enumerate() {
        let Some(text) = pattern_from_bytes(bs) else {
            continue;
        };
        let Ok(pattern) = Pattern::parse(&text) else {
            continue;
        };
        // The conflict index prunes candidates for the mux; the set scans
        // every pattern. If the mux accepts a pattern the exhaustive scan
        // rejects, the index dropped a true conflict.
        if mux.register(&text, i).is_ok() {
            set.register(pattern)
                .expect("conflict index missed a conflict");
        }
    }

    let path = path_from_bytes(&path_bytes);
    let req = http::Request::get(path.as_str()).body(()).unwrap();
    let from_set = set
        .match_request("GET", "", &path)
        .map(|(pattern, _)| pattern.to_string());
    match mux.lookup(&req) {
        // The linear set has no notion of redirects; nothing to compare.
        RouteOutcome::Redirect(_) => {}
        RouteOutcome::Matched { pattern, .. } => {
            assert_eq!(Some(pattern.to_string()), from_set, "path {:?}", path)
        }
        _ => assert_eq!(None, from_set, "path {:?}", path),
    }
});

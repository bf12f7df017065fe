//! The request multiplexer: thread-safe registration and lookup.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use http::{header, Method, Request};

use crate::error::RegisterError;
use crate::index::RoutingIndex;
use crate::path::{clean_path, might_need_cleaning};
use crate::pattern::Pattern;
use crate::relation::describe;
use crate::tree::Node;

/// The result of routing one request.
pub enum RouteOutcome<H> {
    /// Dispatch to `handler`; `values` holds the decoded wildcard captures
    /// in the order the wildcards appear in `pattern`.
    Matched {
        handler: Arc<H>,
        pattern: Arc<Pattern>,
        values: Vec<String>,
    },
    /// Send a 301 Moved Permanently to this location.
    Redirect(String),
    /// The path is served under other methods only: send a 405 with these
    /// methods in the Allow header.
    MethodNotAllowed(Vec<String>),
    /// Send a 404.
    NotFound,
}

impl<H> fmt::Debug for RouteOutcome<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { pattern, values, .. } => f
                .debug_struct("Matched")
                .field("pattern", &pattern.to_string())
                .field("values", values)
                .finish(),
            Self::Redirect(location) => f.debug_tuple("Redirect").field(location).finish(),
            Self::MethodNotAllowed(methods) => {
                f.debug_tuple("MethodNotAllowed").field(methods).finish()
            }
            Self::NotFound => f.write_str("NotFound"),
        }
    }
}

/// An HTTP request multiplexer.
///
/// Patterns are registered with handlers; [`Mux::lookup`] resolves a
/// request to the handler of the uniquely most specific matching pattern.
/// Registration rejects any pattern that conflicts with an existing one,
/// so the winner is never ambiguous.
///
/// ```
/// use http::Request;
/// use servemux::{Mux, RouteOutcome};
///
/// let mux: Mux<&'static str> = Mux::new();
/// mux.register("/item/{user}", "item")?;
/// mux.register("GET /item/{user}/orders/{id...}", "orders")?;
///
/// let req = Request::get("http://example.com/item/jba/orders/17/42")
///     .body(())
///     .unwrap();
/// match mux.lookup(&req) {
///     RouteOutcome::Matched { handler, values, .. } => {
///         assert_eq!(*handler, "orders");
///         assert_eq!(values, ["jba", "17/42"]);
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// # Ok::<(), servemux::RegisterError>(())
/// ```
pub struct Mux<H> {
    routes: RwLock<RouteTable<H>>,
    bindings: RwLock<HashMap<u64, MatchState>>,
    next_token: AtomicU64,
}

struct RouteTable<H> {
    tree: Node<H>,
    index: RoutingIndex,
}

/// The recorded result of a successful match, read back by
/// [`Mux::path_value`] while the handler runs.
struct MatchState {
    pattern: Arc<Pattern>,
    values: Vec<String>,
    overrides: Vec<(String, String)>,
}

impl MatchState {
    fn lookup(&self, name: &str) -> String {
        if let Some((_, value)) = self.overrides.iter().rev().find(|(n, _)| n == name) {
            return value.clone();
        }
        let mut i = 0;
        for seg in self.pattern.segments() {
            if let Some(n) = seg.capture_name() {
                if n == name {
                    return self.values.get(i).cloned().unwrap_or_default();
                }
                i += 1;
            }
        }
        String::new()
    }
}

/// Ties a request to its entry in the per-request binding store.
#[derive(Clone, Copy)]
struct BindToken(u64);

enum MatchOrRedirect<H> {
    Found(Arc<Pattern>, Arc<H>, Vec<String>),
    Redirect,
    None,
}

impl<H> Default for Mux<H> {
    fn default() -> Self {
        Mux {
            routes: RwLock::new(RouteTable {
                tree: Node::new(),
                index: RoutingIndex::new(),
            }),
            bindings: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }
}

impl<H> Mux<H> {
    pub fn new() -> Self {
        Mux::default()
    }

    /// Registers a handler for a pattern.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not parse or conflicts with an existing
    /// registration. Use [`Mux::register`] to handle the error instead.
    #[track_caller]
    pub fn handle(&self, pattern: &str, handler: H) {
        let loc = Location::caller().to_string();
        if let Err(err) = self.register_at(pattern, handler, loc) {
            panic!("{}", err);
        }
    }

    /// Registers a handler for a pattern, failing on invalid pattern text
    /// or on a conflict with an existing pattern. The conflict error names
    /// both patterns, their registration sites and how they overlap.
    #[track_caller]
    pub fn register(&self, pattern: &str, handler: H) -> Result<(), RegisterError> {
        self.register_at(pattern, handler, Location::caller().to_string())
    }

    fn register_at(&self, pattern: &str, handler: H, loc: String) -> Result<(), RegisterError> {
        let mut pat = Pattern::parse(pattern)?;
        pat.loc = loc;
        let pat = Arc::new(pat);

        let mut routes = write_lock(&self.routes);
        routes.index.possibly_conflicting(&pat, |existing| {
            if pat.conflicts_with(existing) {
                Err(RegisterError::Conflict {
                    pattern: pat.to_string(),
                    location: pat.loc.clone(),
                    existing: existing.to_string(),
                    existing_location: existing.loc.clone(),
                    description: describe(&pat, existing),
                })
            } else {
                Ok(())
            }
        })?;
        routes.tree.add_pattern(pat.clone(), Arc::new(handler));
        routes.index.add_pattern(pat.clone());
        tracing::debug!(pattern = %pat, location = %pat.loc, "registered pattern");
        Ok(())
    }

    /// Routes a request, applying path canonicalisation and the redirect
    /// rules but without dispatching or recording anything.
    ///
    /// CONNECT requests keep their path and host untouched: the URL host
    /// decides whether a trailing-slash redirect applies, and the Host
    /// header resolves the handler. All other requests have the Host port
    /// stripped and the path cleaned first; a request whose path cleans to
    /// something else is redirected rather than served.
    pub fn lookup<B>(&self, req: &Request<B>) -> RouteOutcome<H> {
        let method = req.method().as_str();
        let path = req.uri().path();
        let query = req.uri().query();

        if req.method() == Method::CONNECT {
            // The /tree -> /tree/ redirect applies to CONNECT requests,
            // but path canonicalisation does not.
            let uri_host = req.uri().host().unwrap_or("");
            if let MatchOrRedirect::Redirect = self.match_or_redirect(method, uri_host, path, true)
            {
                return self.redirect(&format!("{}/", path), query);
            }
            // Redo the match with the Host header, and without the
            // trailing-slash logic.
            let host = request_host(req);
            return match self.match_or_redirect(method, host, path, false) {
                MatchOrRedirect::Found(pattern, handler, values) => RouteOutcome::Matched {
                    handler,
                    pattern,
                    values,
                },
                _ => self.miss(host, path),
            };
        }

        let host = strip_host_port(request_host(req));
        let clean: Cow<'_, str> = if might_need_cleaning(path) {
            Cow::Owned(clean_path(path))
        } else {
            Cow::Borrowed(path)
        };

        let hit = self.match_or_redirect(method, host, &clean, true);
        if let MatchOrRedirect::Redirect = hit {
            // An exact match exists for the path with a trailing slash.
            return self.redirect(&format!("{}/", clean), query);
        }
        if clean != path {
            return self.redirect(&clean, query);
        }
        match hit {
            MatchOrRedirect::Found(pattern, handler, values) => RouteOutcome::Matched {
                handler,
                pattern,
                values,
            },
            _ => self.miss(host, &clean),
        }
    }

    /// Matches once, and if the result is not exact checks whether the
    /// slash-appended path would match exactly. Both attempts run under a
    /// single read-lock acquisition and so see the same pattern set.
    fn match_or_redirect(
        &self,
        method: &str,
        host: &str,
        path: &str,
        redirect_ok: bool,
    ) -> MatchOrRedirect<H> {
        let routes = read_lock(&self.routes);
        let hit = routes.tree.match_route(method, host, path);
        let exact = match &hit {
            Some((n, _)) => exact_match(n.pattern().map(|p| p.as_ref()), path),
            None => false,
        };
        if !exact && redirect_ok {
            let slashed = format!("{}/", path);
            if let Some((n2, _)) = routes.tree.match_route(method, host, &slashed) {
                if exact_match(n2.pattern().map(|p| p.as_ref()), &slashed) {
                    return MatchOrRedirect::Redirect;
                }
            }
        }
        match hit {
            Some((n, values)) => match (n.pattern(), n.handler()) {
                (Some(pattern), Some(handler)) => {
                    MatchOrRedirect::Found(pattern.clone(), handler.clone(), values)
                }
                _ => MatchOrRedirect::None,
            },
            None => MatchOrRedirect::None,
        }
    }

    fn redirect(&self, path: &str, query: Option<&str>) -> RouteOutcome<H> {
        let location = match query {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        };
        tracing::trace!(location = %location, "redirecting");
        RouteOutcome::Redirect(location)
    }

    /// No pattern matched: distinguish 405 from 404 by checking which
    /// methods would have matched the path.
    fn miss(&self, host: &str, path: &str) -> RouteOutcome<H> {
        let routes = read_lock(&self.routes);
        let mut methods = BTreeSet::new();
        routes.tree.matching_methods(host, path, &mut methods);
        if methods.is_empty() {
            RouteOutcome::NotFound
        } else {
            RouteOutcome::MethodNotAllowed(methods.into_iter().collect())
        }
    }

    /// Records a match in the per-request binding store so that
    /// [`Mux::path_value`] works while the handler runs. The request is
    /// stamped with a token tying it to its entry.
    pub fn bind_match<B>(
        &self,
        req: &mut Request<B>,
        pattern: Arc<Pattern>,
        values: Vec<String>,
    ) {
        let token = BindToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        req.extensions_mut().insert(token);
        write_lock(&self.bindings).insert(
            token.0,
            MatchState {
                pattern,
                values,
                overrides: Vec::new(),
            },
        );
    }

    /// Returns the decoded value of the named path wildcard in the pattern
    /// that matched this request, or the empty string if there is none.
    pub fn path_value<B>(&self, req: &Request<B>, name: &str) -> String {
        let Some(token) = req.extensions().get::<BindToken>() else {
            return String::new();
        };
        let bindings = read_lock(&self.bindings);
        match bindings.get(&token.0) {
            Some(state) => state.lookup(name),
            None => String::new(),
        }
    }

    /// Overrides the value returned by [`Mux::path_value`] for `name`.
    /// Has no effect on a request that never matched.
    pub fn set_path_value<B>(&self, req: &Request<B>, name: &str, value: impl Into<String>) {
        let Some(token) = req.extensions().get::<BindToken>().copied() else {
            return;
        };
        let mut bindings = write_lock(&self.bindings);
        if let Some(state) = bindings.get_mut(&token.0) {
            state.overrides.push((name.to_string(), value.into()));
        }
    }
}

/// Reports whether the node's pattern matches the path exactly, with no
/// multi wildcard absorbing a tail the path doesn't spell out.
fn exact_match(pattern: Option<&Pattern>, path: &str) -> bool {
    let Some(pattern) = pattern else {
        return false;
    };
    if !path.is_empty() && !path.ends_with('/') {
        // A path without a trailing slash is matched exactly unless the
        // final segment is a multi wildcard.
        return !pattern.last_segment().is_multi();
    }
    // Only patterns ending in {$} or a multi can match a path with a
    // trailing slash. The match is exact when the pattern spells out every
    // component: as many segments as the path has slashes.
    pattern.segments().len() == path.matches('/').count()
}

/// The request's host: the Host header if present, else the URL authority.
fn request_host<B>(req: &Request<B>) -> &str {
    if let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
    {
        return host;
    }
    req.uri().authority().map_or("", |a| a.as_str())
}

/// Returns `host` without any trailing `":port"`. Malformed hosts are
/// returned unchanged.
fn strip_host_port(host: &str) -> &str {
    if !host.contains(':') {
        return host;
    }
    if let Some(rest) = host.strip_prefix('[') {
        // "[v6]:port" yields the bracketed address's contents; a bare
        // "[v6]" carries no port.
        if let Some(i) = rest.find(']') {
            if rest[i + 1..].starts_with(':') {
                return &rest[..i];
            }
        }
        return host;
    }
    match host.rfind(':') {
        Some(i) if !host[..i].contains(':') => &host[..i],
        _ => host,
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

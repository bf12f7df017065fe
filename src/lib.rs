#![deny(rust_2018_idioms)]

//! An HTTP request multiplexer with method, host and wildcard routing
//! patterns.
//!
//! Patterns pair a piece of text with a handler; an incoming request is
//! routed to the handler of the uniquely most specific pattern that
//! matches it.
//!
//! ```rust
//! use http::Request;
//! use servemux::{Mux, RouteOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mux: Mux<&'static str> = Mux::new();
//! mux.register("/", "home")?;
//! mux.register("GET /users/{id}", "user")?;
//!
//! let req = Request::get("/users/17").body(()).unwrap();
//! match mux.lookup(&req) {
//!     RouteOutcome::Matched { handler, values, .. } => {
//!         assert_eq!(*handler, "user");
//!         assert_eq!(values, ["17"]);
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Pattern syntax
//!
//! A pattern has the form `[METHOD ][HOST]/[PATH]`:
//!
//! ```text
//! Pattern                       Matches
//! /index.html                   the path /index.html, any method and host
//! GET /static/                  GET (and HEAD) requests under /static/
//! example.com/                  any request to host example.com
//! POST /items/{id}              POST to /items/<one segment>
//! /files/{path...}              any path under /files/
//! /exact/{$}                    the path /exact/ and nothing below it
//! ```
//!
//! `{name}` matches exactly one non-empty path segment; its value is
//! available to the handler through [`Mux::path_value`]. `{name...}`
//! matches the entire remaining path and must be the final segment. A
//! pattern ending in `/` matches every path under that prefix, while
//! `{$}` pins the match to the trailing slash itself. Captured values are
//! percent-decoded.
//!
//! ### Precedence and conflicts
//!
//! When several patterns match a request, the most specific one wins:
//! patterns naming the request's host beat host-less patterns, an exact
//! method match beats a method-less one (HEAD requests also try GET), and
//! literal segments beat wildcards. Two patterns that can both match some
//! request without either being more specific are in conflict, and
//! registering the second fails with an error that spells out an example
//! path both match. There is no registration-order dependence.
//!
//! ### Request treatment
//!
//! Request paths are canonicalised before matching: repeated slashes and
//! `.`/`..` segments collapse, and a request whose path cleans to
//! something different is redirected (301). A request that only misses a
//! match by its trailing slash is redirected to the slash-terminated
//! path. When the path is served under other methods only, lookup reports
//! Method Not Allowed (405) with the allowed set. CONNECT requests are
//! matched with their path and host untouched.

mod error;
mod index;
mod mapping;
mod mux;
mod path;
mod pattern;
mod relation;
mod set;
mod tree;

#[cfg(feature = "hyper-server")]
mod service;

pub use error::{PatternError, RegisterError};
pub use mux::{Mux, RouteOutcome};
pub use pattern::Pattern;
pub use relation::describe_relationship;
pub use set::PatternSet;

#[cfg(feature = "hyper-server")]
pub use service::{BoxedHandler, Handler, MakeMuxService, MuxService};

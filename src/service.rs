//! Hyper integration: serve a [`Mux`] as a `hyper` service.
//!
//! Handlers are async functions from a request to a response. The service
//! applies the multiplexer's full request treatment: 400 for a `"*"`
//! request URI, 301 redirects for trailing-slash and unclean paths, 405
//! with an `Allow` header when only other methods match, 404 otherwise,
//! and recording of path values before the matched handler runs.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{ok, Future};
use hyper::service::Service;
use hyper::{header, Body, Request, Response, StatusCode, Version};

use crate::mux::{Mux, RouteOutcome};

type HandlerResult = Result<Response<Body>, hyper::Error>;
type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// An asynchronous request handler.
///
/// Implemented for any async function from a request to a response:
///
/// ```
/// use hyper::{Body, Request, Response};
/// use servemux::{BoxedHandler, Handler, Mux};
///
/// async fn hello(_req: Request<Body>) -> hyper::Result<Response<Body>> {
///     Ok(Response::new(Body::from("hello")))
/// }
///
/// let mux: Mux<BoxedHandler> = Mux::new();
/// mux.handle("GET /hello", Box::new(hello));
/// ```
pub trait Handler {
    fn handle(&self, req: Request<Body>) -> HandlerFuture;
}

impl<F, R> Handler for F
where
    F: Fn(Request<Body>) -> R,
    R: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, req: Request<Body>) -> HandlerFuture {
        Box::pin(self(req))
    }
}

pub type BoxedHandler = Box<dyn Handler + Send + Sync>;

/// Makes a [`MuxService`] per connection.
pub struct MakeMuxService(pub MuxService);

impl<T> Service<T> for MakeMuxService {
    type Response = MuxService;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        let service = self.0.clone();
        Box::pin(async move { Ok(service) })
    }
}

#[derive(Clone)]
pub struct MuxService(pub Arc<Mux<BoxedHandler>>);

impl Service<Request<Body>> for MuxService {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = HandlerFuture;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.0.serve(req)
    }
}

impl Mux<BoxedHandler> {
    /// Converts the mux into a hyper `Service`.
    ///
    /// ```no_run
    /// use hyper::{Body, Request, Response};
    /// use servemux::{BoxedHandler, Mux};
    ///
    /// async fn index(_req: Request<Body>) -> hyper::Result<Response<Body>> {
    ///     Ok(Response::new(Body::from("Hello, world!")))
    /// }
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let mux: Mux<BoxedHandler> = Mux::new();
    /// mux.handle("GET /{$}", Box::new(index));
    ///
    /// hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
    ///     .serve(mux.into_service())
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeMuxService {
        MakeMuxService(MuxService(Arc::new(self)))
    }

    /// Resolves one request and dispatches it, recording the matched
    /// pattern's path values first so [`Mux::path_value`] works inside the
    /// handler.
    pub fn serve(&self, mut req: Request<Body>) -> HandlerFuture {
        if req.uri().path() == "*" {
            let mut response = Response::builder().status(StatusCode::BAD_REQUEST);
            if req.version() >= Version::HTTP_11 {
                response = response.header(header::CONNECTION, "close");
            }
            return Box::pin(ok(response.body(Body::empty()).unwrap()));
        }

        match self.lookup(&req) {
            RouteOutcome::Matched {
                handler,
                pattern,
                values,
            } => {
                self.bind_match(&mut req, pattern, values);
                handler.handle(req)
            }
            RouteOutcome::Redirect(location) => Box::pin(ok(Response::builder()
                .status(StatusCode::MOVED_PERMANENTLY)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .unwrap())),
            RouteOutcome::MethodNotAllowed(methods) => Box::pin(ok(Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(header::ALLOW, methods.join(", "))
                .body(Body::empty())
                .unwrap())),
            RouteOutcome::NotFound => Box::pin(ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::empty())
                .unwrap())),
        }
    }
}

//! Router core - route table and the composition root for dispatch.

use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};
use url::Url;

use crate::dispatcher::{self, DispatchError};
use crate::middleware::{FunctionMiddleware, Middleware, MiddlewareEntry, WrappingMiddleware};
use crate::pipeline::{Context, RouterRequest, RouterResponse};

use super::builder::RouteBuilder;
use super::pattern::{ParamVec, PathPattern};

/// A registered request handler.
///
/// Handlers receive the request (with path parameters populated) and the
/// per-request [`Context`]; errors propagate out of dispatch unmodified so
/// the embedding transport decides how to surface them.
pub trait Handler: Send + Sync {
    fn call(&self, req: &RouterRequest, ctx: &mut Context) -> Result<RouterResponse, anyhow::Error>;
}

impl<F> Handler for F
where
    F: Fn(&RouterRequest, &mut Context) -> Result<RouterResponse, anyhow::Error> + Send + Sync,
{
    fn call(&self, req: &RouterRequest, ctx: &mut Context) -> Result<RouterResponse, anyhow::Error> {
        self(req, ctx)
    }
}

/// Method predicate on a route: an exact verb, or any verb (`all(...)`).
/// Comparison is case-sensitive; `http::Method` keeps standard verbs
/// uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Exact(Method),
    Any,
}

impl MethodFilter {
    #[inline]
    #[must_use]
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Exact(m) => m == method,
            MethodFilter::Any => true,
        }
    }
}

/// A registered (method, compiled pattern, handler) triple.
/// Immutable once registered; lives for the router's lifetime.
#[derive(Clone)]
pub struct Route {
    pub(crate) filter: MethodFilter,
    pub(crate) pattern: PathPattern,
    pub(crate) handler: Arc<dyn Handler>,
}

impl Route {
    #[must_use]
    pub fn method_filter(&self) -> &MethodFilter {
        &self.filter
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.pattern()
    }
}

/// Ordered collection of routes.
///
/// Lookup scans in registration order and returns the first route whose
/// pattern matches the path *and* whose method filter accepts the request
/// method; first registered wins on ties. The table never produces the 404
/// fallback itself; that belongs to the coordinator.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, filter: MethodFilter, pattern: &str, handler: Arc<dyn Handler>) {
        let pattern = PathPattern::compile(pattern);
        debug!(
            pattern = pattern.pattern(),
            filter = ?filter,
            route_count = self.routes.len() + 1,
            "Route registered"
        );
        self.routes.push(Route {
            filter,
            pattern,
            handler,
        });
    }

    /// Find the first matching route for `(method, path)` in registration
    /// order, extracting path parameters.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<(&Route, ParamVec)> {
        for route in &self.routes {
            if !route.filter.matches(method) {
                continue;
            }
            if let Some(params) = route.pattern.match_path(path) {
                debug!(
                    method = %method,
                    path = %path,
                    route_pattern = route.pattern.pattern(),
                    path_params = ?params,
                    "Route matched"
                );
                return Some((route, params));
            }
        }
        warn!(method = %method, path = %path, "No route matched");
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

/// Registration counts exposed for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub route_count: usize,
    pub middleware_count: usize,
}

/// The composition root: one middleware stack, one route table, and the
/// single `dispatch` entry point.
///
/// Middleware ordering is registration order and is load-bearing: it
/// determines before/after nesting. Mounting a sub-router flattens its
/// entries into the parent at mount time with composed prefixes, so dispatch
/// never recurses through router objects. The same `Router` instance may be
/// mounted at more than one prefix; the entries share their `Arc`'d bodies
/// while the composed prefixes stay independent.
#[derive(Clone, Default)]
pub struct Router {
    middlewares: Vec<MiddlewareEntry>,
    routes: RouteTable,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw middleware entry. Prefer the `use_fn`/`use_wrap`
    /// convenience registrars.
    pub fn use_middleware(&mut self, entry: MiddlewareEntry) {
        self.middlewares.push(entry);
    }

    /// Register an unscoped function middleware (pre-only; may short-circuit).
    pub fn use_fn<M: FunctionMiddleware + 'static>(&mut self, middleware: M) {
        self.middlewares
            .push(MiddlewareEntry::new(None, Middleware::function(middleware)));
    }

    /// Register an unscoped wrapping middleware (wraps the downstream call).
    pub fn use_wrap<M: WrappingMiddleware + 'static>(&mut self, middleware: M) {
        self.middlewares
            .push(MiddlewareEntry::new(None, Middleware::wrapping(middleware)));
    }

    /// Register a function middleware scoped to a path prefix.
    ///
    /// Prefix matching is segment-boundary: `/admin` applies to `/admin` and
    /// `/admin/users` but not `/administrator`.
    pub fn use_fn_scoped<M: FunctionMiddleware + 'static>(&mut self, prefix: &str, middleware: M) {
        let prefix = normalize_prefix(prefix);
        self.middlewares.push(MiddlewareEntry::new(
            Some(prefix),
            Middleware::function(middleware),
        ));
    }

    /// Register a wrapping middleware scoped to a path prefix.
    pub fn use_wrap_scoped<M: WrappingMiddleware + 'static>(&mut self, prefix: &str, middleware: M) {
        let prefix = normalize_prefix(prefix);
        self.middlewares.push(MiddlewareEntry::new(
            Some(prefix),
            Middleware::wrapping(middleware),
        ));
    }

    /// Start registering routes for a path template:
    /// `router.route("/pets/:id").get(show).delete(remove)`.
    pub fn route(&mut self, pattern: &str) -> RouteBuilder<'_> {
        RouteBuilder::new(self, pattern)
    }

    pub(crate) fn register_route(
        &mut self,
        filter: MethodFilter,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) {
        self.routes.register(filter, pattern, handler);
    }

    /// Mount all of `sub`'s routes and middleware under `prefix`.
    ///
    /// Flattens at mount time: every entry is re-registered here with
    /// `prefix` prepended to its own prefix/pattern, composing left-to-right
    /// through nested mounts. Routes or middleware added to `sub` *after*
    /// this call do not appear under the parent.
    pub fn mount(&mut self, prefix: &str, sub: &Router) {
        let prefix = normalize_prefix(prefix);

        for entry in &sub.middlewares {
            let composed = match entry.path_prefix() {
                Some(inner) => Some(compose_prefix(&prefix, inner)),
                None if prefix == "/" => None,
                None => Some(prefix.clone()),
            };
            self.middlewares
                .push(MiddlewareEntry::new(composed, entry.middleware().clone()));
        }

        for route in sub.routes.iter() {
            let pattern = compose_prefix(&prefix, route.pattern.pattern());
            self.routes
                .register(route.filter.clone(), &pattern, Arc::clone(&route.handler));
        }

        info!(
            prefix = %prefix,
            mounted_routes = sub.routes.len(),
            mounted_middleware = sub.middlewares.len(),
            "Sub-router mounted"
        );
    }

    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            route_count: self.routes.len(),
            middleware_count: self.middlewares.len(),
        }
    }

    /// Print all registered routes to stdout. Useful for verifying a
    /// composed router at startup.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in self.routes.iter() {
            let verb = match &route.filter {
                MethodFilter::Exact(m) => m.to_string(),
                MethodFilter::Any => "*".to_string(),
            };
            println!("[route] {verb} {}", route.pattern.pattern());
        }
    }

    /// Service one request through the full pipeline.
    ///
    /// Creates a fresh [`Context`], captures the original URL for the
    /// terminal redirect comparison, and drives the middleware chain from
    /// index 0. Errors (origin violations, malformed rewrites, handler
    /// failures no middleware caught) propagate to the caller unmodified;
    /// the router never converts them into responses.
    pub fn dispatch(&self, request: RouterRequest) -> Result<RouterResponse, DispatchError> {
        let mut request = request;
        let original_url =
            Url::parse(&request.url).map_err(|source| DispatchError::MalformedUrl {
                url: request.url.clone(),
                source,
            })?;

        let mut ctx = Context::new();
        debug!(
            request_id = %request.request_id,
            method = %request.method,
            url = %request.url,
            middleware_count = self.middlewares.len(),
            "Dispatch start"
        );

        dispatcher::run(
            &self.middlewares,
            &self.routes,
            0,
            &original_url,
            &mut request,
            &mut ctx,
        )
    }
}

/// Validate and normalize a middleware/mount prefix: must start with `/`;
/// trailing slash is dropped so `/admin/` and `/admin` scope identically.
///
/// # Panics
///
/// Panics at registration time when the prefix does not start with `/`.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    assert!(
        prefix.starts_with('/'),
        "path prefix {prefix:?} must start with '/'"
    );
    if prefix.len() > 1 && prefix.ends_with('/') {
        prefix.trim_end_matches('/').to_string()
    } else {
        prefix.to_string()
    }
}

/// Join a mount prefix with an inner prefix or pattern.
/// `compose_prefix("/outer", "/inner")` is `/outer/inner`; a root inner path
/// collapses to the prefix itself.
fn compose_prefix(prefix: &str, inner: &str) -> String {
    if prefix == "/" {
        inner.to_string()
    } else if inner == "/" {
        prefix.to_string()
    } else {
        format!("{prefix}{inner}")
    }
}

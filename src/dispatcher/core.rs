//! Dispatcher core - the execution coordinator for one request.
//!
//! `run` is a recursive function over the middleware index: each step either
//! skips an entry whose prefix does not apply, invokes a function middleware
//! (which may short-circuit), or hands a wrapping middleware a [`Next`]
//! continuation for the rest of the chain. When the stack is exhausted the
//! terminal step compares the current request target against the URL
//! originally supplied to dispatch (synthesizing a redirect if middleware
//! rewrote it) and otherwise consults the route table, falling back to 404.

use http::Method;
use tracing::{debug, warn};
use url::Url;

use crate::middleware::{Middleware, MiddlewareEntry};
use crate::pipeline::{Context, RouterRequest, RouterResponse};
use crate::router::RouteTable;

/// Everything that can abort a dispatch.
///
/// The coordinator never converts one of these into an HTTP response; they
/// propagate to the dispatch caller unless a wrapping middleware catches the
/// `Err` arm of its delegation and substitutes a response. Turning handler
/// errors into 500s is application policy, implemented as an outer wrapping
/// middleware, never here.
#[derive(Debug)]
pub enum DispatchError {
    /// Middleware rewrote the request to a different origin
    /// (scheme+host+port). The only permitted cross-origin rewrite is an
    /// http→https upgrade on the same host.
    OriginViolation {
        /// The URL originally supplied to dispatch
        original: String,
        /// The rewritten URL observed at the terminal step
        rewritten: String,
    },
    /// The rewritten URL is not a parseable absolute URL.
    MalformedUrl {
        /// The offending URL text
        url: String,
        /// The parse failure
        source: url::ParseError,
    },
    /// A handler or middleware failed; carried unmodified.
    Handler(anyhow::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::OriginViolation {
                original,
                rewritten,
            } => {
                write!(
                    f,
                    "origin violation: request rewritten from '{original}' to '{rewritten}', \
                    which is a different origin (scheme+host+port)"
                )
            }
            DispatchError::MalformedUrl { url, source } => {
                write!(
                    f,
                    "rewritten request URL '{url}' is not a parseable absolute URL: {source}"
                )
            }
            DispatchError::Handler(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::MalformedUrl { source, .. } => Some(source),
            DispatchError::Handler(err) => {
                let err: &(dyn std::error::Error + 'static) = err.as_ref();
                Some(err)
            }
            DispatchError::OriginViolation { .. } => None,
        }
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Handler(err)
    }
}

/// Continuation for the rest of the chain, handed to wrapping middleware.
///
/// Consumed by value: exactly one delegation per middleware invocation is
/// expressible, so "delegates more than once" is a compile error rather than
/// undefined behavior. A middleware that never calls it short-circuits with
/// its own response; one that calls it and returns the result unchanged is a
/// plain passthrough.
pub struct Next<'a> {
    chain: &'a [MiddlewareEntry],
    routes: &'a RouteTable,
    index: usize,
    original_url: &'a Url,
}

impl Next<'_> {
    /// Delegate to the remainder of the chain.
    ///
    /// A request mutation performed before this call is visible to
    /// everything downstream; the returned response may be mutated before
    /// the middleware returns it. An `Err` here is a failure from somewhere
    /// downstream of the delegation point; matching on it and returning
    /// `Ok(response)` instead implements catch semantics and stops the
    /// propagation.
    pub fn run(
        self,
        req: &mut RouterRequest,
        ctx: &mut Context,
    ) -> Result<RouterResponse, DispatchError> {
        run(
            self.chain,
            self.routes,
            self.index,
            self.original_url,
            req,
            ctx,
        )
    }
}

/// One step of the coordinator; called with index 0 once per dispatch.
pub(crate) fn run(
    chain: &[MiddlewareEntry],
    routes: &RouteTable,
    index: usize,
    original_url: &Url,
    req: &mut RouterRequest,
    ctx: &mut Context,
) -> Result<RouterResponse, DispatchError> {
    let Some(entry) = chain.get(index) else {
        return terminal(routes, original_url, req, ctx);
    };

    if entry.path_prefix().is_some() {
        // The prefix filter sees the *current* (possibly rewritten) path. A
        // URL that no longer parses cannot match any prefix; the terminal
        // step owns rejecting it.
        let applies = match req.path() {
            Some(path) => entry.applies_to(&path),
            None => false,
        };
        if !applies {
            return run(chain, routes, index + 1, original_url, req, ctx);
        }
    }

    match entry.middleware() {
        Middleware::Function(middleware) => {
            match middleware.call(req, ctx).map_err(DispatchError::Handler)? {
                Some(response) => {
                    debug!(
                        request_id = %req.request_id,
                        middleware_index = index,
                        status = response.status,
                        "Function middleware short-circuited"
                    );
                    Ok(response)
                }
                None => run(chain, routes, index + 1, original_url, req, ctx),
            }
        }
        Middleware::Wrapping(middleware) => {
            let next = Next {
                chain,
                routes,
                index: index + 1,
                original_url,
            };
            middleware.call(req, ctx, next)
        }
    }
}

/// The terminal step: redirect check, then route lookup, then the 404
/// fallback. Reached only when every middleware has either been skipped or
/// delegated all the way down.
fn terminal(
    routes: &RouteTable,
    original_url: &Url,
    req: &mut RouterRequest,
    ctx: &mut Context,
) -> Result<RouterResponse, DispatchError> {
    // Rewrite detection compares parsed URLs, so a rewrite to an equivalent
    // normalized spelling of the original is not a redirect.
    if req.url != original_url.as_str() {
        let current = Url::parse(&req.url).map_err(|source| DispatchError::MalformedUrl {
            url: req.url.clone(),
            source,
        })?;
        if current != *original_url {
            return synthesize_redirect(original_url, &current, &req.method);
        }
    }

    match routes.lookup(&req.method, original_url.path()) {
        Some((route, params)) => {
            req.path_params = params;
            route.handler.call(req, ctx).map_err(DispatchError::Handler)
        }
        None => {
            debug!(
                request_id = %req.request_id,
                method = %req.method,
                path = original_url.path(),
                "No route matched after full middleware execution"
            );
            Ok(RouterResponse::not_found())
        }
    }
}

/// Build the redirect for a rewritten request target, or reject it.
///
/// 301 for a scheme upgrade, 302 for a GET, 307 (method-preserving)
/// otherwise. The `location` is the new absolute URL; a path-only rewrite
/// keeps the query string verbatim because it rides along in the URL.
fn synthesize_redirect(
    original: &Url,
    current: &Url,
    method: &Method,
) -> Result<RouterResponse, DispatchError> {
    if !rewrite_preserves_origin(original, current) {
        warn!(
            original = %original,
            rewritten = %current,
            "Cross-origin rewrite rejected"
        );
        return Err(DispatchError::OriginViolation {
            original: original.to_string(),
            rewritten: current.to_string(),
        });
    }

    let status = if current.scheme() != original.scheme() {
        301
    } else if *method == Method::GET {
        302
    } else {
        307
    };

    debug!(
        status,
        location = %current,
        "Redirect synthesized for rewritten request target"
    );
    Ok(RouterResponse::redirect(status, current.as_str()))
}

fn rewrite_preserves_origin(original: &Url, current: &Url) -> bool {
    if original.origin() == current.origin() {
        return true;
    }
    // The explicit protocol upgrade rule: http→https on the same host, with
    // the same explicit port or none on either side. Downgrades, host
    // changes, and exotic schemes all fail the check.
    original.scheme() == "http"
        && current.scheme() == "https"
        && original.host_str() == current.host_str()
        && original.port() == current.port()
}

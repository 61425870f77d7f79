use std::sync::Arc;

use crate::dispatcher::{DispatchError, Next};
use crate::pipeline::{Context, RouterRequest, RouterResponse};

/// Pre-only middleware: runs before anything downstream, never observes the
/// downstream response.
///
/// Returning `Ok(Some(response))` short-circuits the chain: no further
/// middleware or handler runs for this request. Returning `Ok(None)`
/// continues; the downstream result passes through unchanged.
pub trait FunctionMiddleware: Send + Sync {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
    ) -> Result<Option<RouterResponse>, anyhow::Error>;
}

impl<F> FunctionMiddleware for F
where
    F: Fn(&mut RouterRequest, &mut Context) -> Result<Option<RouterResponse>, anyhow::Error>
        + Send
        + Sync,
{
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
    ) -> Result<Option<RouterResponse>, anyhow::Error> {
        self(req, ctx)
    }
}

/// Middleware that wraps the downstream call.
///
/// "Before" logic runs ahead of `next.run(...)`, "after" logic runs on its
/// return value, and matching on the `Err` arm of the delegation implements
/// catch semantics: a downstream failure surfaces exactly at the delegation
/// point, where this middleware may convert it into a normal response and
/// stop the propagation.
///
/// Three shapes are legal:
/// - return a response without calling `next`, a short-circuit with zero
///   delegation (e.g. an auth check that rejects);
/// - call `next.run(req, ctx)` and return its value, possibly after mutating
///   the request first (rewrites are visible downstream) or mutating the
///   response afterwards;
/// - return the result of `next` untouched, a plain passthrough.
///
/// `Next` is consumed by value, so delegating more than once does not
/// compile.
pub trait WrappingMiddleware: Send + Sync {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError>;
}

impl<F> WrappingMiddleware for F
where
    F: for<'a> Fn(
            &mut RouterRequest,
            &mut Context,
            Next<'a>,
        ) -> Result<RouterResponse, DispatchError>
        + Send
        + Sync,
{
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        self(req, ctx, next)
    }
}

/// A middleware body with its calling convention resolved at registration
/// time. The kind is an explicit tagged variant, never inferred from the
/// shape of the registered value at dispatch time.
#[derive(Clone)]
pub enum Middleware {
    Function(Arc<dyn FunctionMiddleware>),
    Wrapping(Arc<dyn WrappingMiddleware>),
}

impl Middleware {
    pub fn function<M: FunctionMiddleware + 'static>(middleware: M) -> Self {
        Middleware::Function(Arc::new(middleware))
    }

    pub fn wrapping<M: WrappingMiddleware + 'static>(middleware: M) -> Self {
        Middleware::Wrapping(Arc::new(middleware))
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Middleware::Function(_) => "function",
            Middleware::Wrapping(_) => "wrapping",
        }
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Middleware::{}", self.kind_name())
    }
}

/// One slot in the middleware stack: the body plus an optional path prefix
/// restricting where it applies. Ordering within the stack is registration
/// order and determines before/after nesting.
#[derive(Debug, Clone)]
pub struct MiddlewareEntry {
    path_prefix: Option<String>,
    middleware: Middleware,
}

impl MiddlewareEntry {
    pub fn new(path_prefix: Option<String>, middleware: Middleware) -> Self {
        Self {
            path_prefix,
            middleware,
        }
    }

    #[must_use]
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    #[must_use]
    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// Whether this entry applies to a request path, honoring segment
    /// boundaries: prefix `/admin` applies to `/admin` and `/admin/users`
    /// but not `/administrator`.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        match &self.path_prefix {
            None => true,
            Some(prefix) => prefix_matches(prefix, path),
        }
    }
}

pub(crate) fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::prefix_matches;

    #[test]
    fn prefix_matching_honors_segment_boundaries() {
        assert!(prefix_matches("/admin", "/admin"));
        assert!(prefix_matches("/admin", "/admin/users"));
        assert!(!prefix_matches("/admin", "/administrator"));
        assert!(!prefix_matches("/admin", "/api/admin"));
    }

    #[test]
    fn root_prefix_only_matches_root() {
        assert!(prefix_matches("/", "/"));
        assert!(!prefix_matches("/", "/x"));
    }
}

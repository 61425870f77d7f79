use std::sync::Arc;

use http::Method;

use super::core::{Handler, MethodFilter, Router};

/// Chaining registration surface returned by [`Router::route`].
///
/// One registrar per HTTP verb plus [`all`](Self::all); each call registers
/// an independent route for the same path template, so
/// `router.route("/pets/:id").get(show).delete(remove)` yields two routes in
/// registration order.
pub struct RouteBuilder<'r> {
    router: &'r mut Router,
    pattern: String,
}

impl<'r> RouteBuilder<'r> {
    pub(crate) fn new(router: &'r mut Router, pattern: &str) -> Self {
        Self {
            router,
            pattern: pattern.to_string(),
        }
    }

    fn register(self, filter: MethodFilter, handler: impl Handler + 'static) -> Self {
        self.router
            .register_route(filter, &self.pattern, Arc::new(handler));
        self
    }

    pub fn get(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::GET), handler)
    }

    pub fn post(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::POST), handler)
    }

    pub fn put(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::PUT), handler)
    }

    pub fn delete(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::DELETE), handler)
    }

    pub fn patch(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::PATCH), handler)
    }

    pub fn head(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::HEAD), handler)
    }

    pub fn options(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Exact(Method::OPTIONS), handler)
    }

    /// Register for every method. An `all` route still loses to any
    /// earlier-registered exact route for the same path.
    pub fn all(self, handler: impl Handler + 'static) -> Self {
        self.register(MethodFilter::Any, handler)
    }
}

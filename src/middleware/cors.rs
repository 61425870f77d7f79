use http::Method;
use regex::Regex;

use super::WrappingMiddleware;
use crate::dispatcher::{DispatchError, Next};
use crate::pipeline::{Context, RouterRequest, RouterResponse};

/// Origin validation strategy
#[derive(Clone)]
pub enum OriginValidation {
    /// Exact string matching
    Exact(Vec<String>),
    /// Wildcard (allow all origins)
    Wildcard,
    /// Regex pattern matching
    Regex(Vec<Regex>),
}

impl std::fmt::Debug for OriginValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginValidation::Exact(origins) => f.debug_tuple("Exact").field(origins).finish(),
            OriginValidation::Wildcard => write!(f, "Wildcard"),
            OriginValidation::Regex(patterns) => f
                .debug_tuple("Regex")
                .field(&patterns.iter().map(|re| re.as_str()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl OriginValidation {
    fn is_allowed(&self, origin: &str) -> bool {
        match self {
            OriginValidation::Exact(origins) => origins.iter().any(|o| o == origin),
            OriginValidation::Wildcard => true,
            OriginValidation::Regex(patterns) => patterns.iter().any(|re| re.is_match(origin)),
        }
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Wildcard)
    }
}

/// CORS (Cross-Origin Resource Sharing) middleware, registered as a wrapping
/// middleware.
///
/// A preflight OPTIONS request is answered directly without delegating
/// downstream (the zero-delegation short-circuit); any other request
/// delegates and then decorates the downstream response with the
/// `access-control-*` headers when the `origin` header passes validation.
/// Because the decoration happens in the after-phase, it also lands on
/// redirects synthesized by the terminal step and on 404s.
pub struct CorsMiddleware {
    origin_validation: OriginValidation,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
}

impl CorsMiddleware {
    /// Build from plain origin strings; a literal `"*"` anywhere in the list
    /// selects wildcard validation.
    pub fn new(origins: Vec<String>, headers: Vec<String>, methods: Vec<Method>) -> Self {
        let origin_validation = if origins.iter().any(|o| o == "*") {
            OriginValidation::Wildcard
        } else {
            OriginValidation::Exact(origins)
        };
        Self {
            origin_validation,
            allowed_headers: headers,
            allowed_methods: methods,
        }
    }

    /// Build with an explicit [`OriginValidation`] strategy.
    pub fn with_validation(
        validation: OriginValidation,
        headers: Vec<String>,
        methods: Vec<Method>,
    ) -> Self {
        Self {
            origin_validation: validation,
            allowed_headers: headers,
            allowed_methods: methods,
        }
    }

    fn allow_origin_value(&self, origin: &str) -> String {
        if self.origin_validation.is_wildcard() {
            "*".to_string()
        } else {
            origin.to_string()
        }
    }

    fn methods_value(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn decorate(&self, origin: &str, res: &mut RouterResponse) {
        res.set_header("access-control-allow-origin", self.allow_origin_value(origin));
        if !self.allowed_headers.is_empty() {
            res.set_header("access-control-allow-headers", self.allowed_headers.join(", "));
        }
        if !self.allowed_methods.is_empty() {
            res.set_header("access-control-allow-methods", self.methods_value());
        }
        res.set_header("vary", "Origin".to_string());
    }

    fn is_preflight(req: &RouterRequest) -> bool {
        req.method == Method::OPTIONS
            && req.get_header("origin").is_some()
            && req.get_header("access-control-request-method").is_some()
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(
            vec!["*".to_string()],
            vec!["Content-Type".to_string(), "Authorization".to_string()],
            vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
        )
    }
}

impl WrappingMiddleware for CorsMiddleware {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        let origin = req.get_header("origin").map(str::to_string);

        if Self::is_preflight(req) {
            // Answered here, with zero delegation: no handler sees preflights.
            let origin = origin.unwrap_or_default();
            if !self.origin_validation.is_allowed(&origin) {
                return Ok(RouterResponse::error(403, "Origin not allowed"));
            }
            let mut res = RouterResponse::json(200, serde_json::Value::Null);
            self.decorate(&origin, &mut res);
            return Ok(res);
        }

        let mut res = next.run(req, ctx)?;
        if let Some(origin) = origin {
            if self.origin_validation.is_allowed(&origin) {
                self.decorate(&origin, &mut res);
            }
        }
        Ok(res)
    }
}

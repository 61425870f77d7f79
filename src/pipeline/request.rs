use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use url::Url;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation.
/// Most requests carry ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the dispatch hot path.
///
/// Header names use `Arc<str>` because they are overwhelmingly repeated
/// literals (`content-type`, `authorization`, …) and `Arc::clone` is an O(1)
/// atomic increment; values stay `String` as per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The request descriptor threaded through the middleware pipeline.
///
/// The `url` field is deliberately a mutable `String`, not a parsed
/// [`Url`]: middleware may rewrite it freely while the request travels down
/// the chain, and a rewrite that fails to parse must surface as an error at
/// the coordinator's terminal step rather than at the point of mutation.
/// The URL originally handed to dispatch is captured separately, before any
/// middleware runs, for the later redirect comparison.
///
/// A rewrite must preserve origin (scheme+host+port) unless it is an
/// http→https upgrade; a cross-origin rewrite is a programming error the
/// terminal step rejects, never a routing outcome.
#[derive(Debug, Clone)]
pub struct RouterRequest {
    /// Unique id for log correlation across the whole pipeline
    pub request_id: RequestId,
    /// HTTP method (GET, POST, …)
    pub method: Method,
    /// Absolute request URL, including origin; mutable during the pipeline
    pub url: String,
    /// Request headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Request body parsed as JSON, if present
    pub body: Option<Value>,
    /// Path parameters extracted from the matched route pattern.
    /// Empty while middleware runs; populated by the terminal step just
    /// before the handler is invoked.
    pub path_params: ParamVec,
}

impl RouterRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            url: url.into(),
            headers: HeaderVec::new(),
            body: None,
            path_params: ParamVec::new(),
        }
    }

    /// Shorthand for a GET request, the common case in tests and examples.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Attach a header, consuming and returning `self` for chaining.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value.into());
        self
    }

    /// Attach a JSON body, consuming and returning `self` for chaining.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Parse the current (possibly rewritten) URL.
    pub fn parsed_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }

    /// The path component of the current URL, or `None` if the URL no longer
    /// parses (a bad rewrite; the terminal step will reject it).
    #[must_use]
    pub fn path(&self) -> Option<String> {
        self.parsed_url().ok().map(|u| u.path().to_string())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive match on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: for duplicate parameter names at
    /// different path depths the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap for compatibility.
    /// Note: this allocates - use get_path_param() in hot paths.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

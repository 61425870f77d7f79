use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::request::HeaderVec;

/// The response descriptor produced by handlers, middleware short-circuits,
/// and the coordinator's redirect/404 synthesis.
///
/// Bodies are `serde_json::Value`; a `Value::String` is written as plain text
/// at the transport edge, everything else as JSON. That is how the literal
/// `"Not Found"` default body is represented.
#[derive(Debug, Clone, Serialize)]
pub struct RouterResponse {
    /// HTTP status code (200, 404, …)
    pub status: u16,
    /// Response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body
    pub body: Value,
}

impl RouterResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with the content-type header preset.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// A plain-text response.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain".to_string()));
        Self {
            status,
            headers,
            body: Value::String(body.to_string()),
        }
    }

    /// A JSON error envelope: `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// The fallback for an unmatched route after full middleware execution.
    #[must_use]
    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    /// A redirect to `location` with an empty body. The coordinator uses this
    /// for 301/302/307 synthesis when middleware rewrote the request target.
    #[must_use]
    pub fn redirect(status: u16, location: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("location"), location.to_string()));
        Self {
            status,
            headers,
            body: Value::Null,
        }
    }

    /// Get a header by name (case-insensitive).
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
}

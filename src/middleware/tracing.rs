use tracing::info_span;

use super::WrappingMiddleware;
use crate::dispatcher::{DispatchError, Next};
use crate::pipeline::{Context, RouterRequest, RouterResponse};

/// Wraps the downstream call in a `request` span and records the resulting
/// status. Registered as wrapping middleware so the span naturally spans the
/// whole delegation, including every later middleware and the handler.
pub struct TracingMiddleware;

impl WrappingMiddleware for TracingMiddleware {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            url = %req.url,
            status = tracing::field::Empty,
        );
        let _guard = span.enter();

        let result = next.run(req, ctx);
        match &result {
            Ok(res) => {
                span.record("status", u64::from(res.status));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Dispatch failed inside request span");
            }
        }
        result
    }
}

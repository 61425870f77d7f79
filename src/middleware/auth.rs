use super::FunctionMiddleware;
use crate::pipeline::{Context, RouterRequest, RouterResponse};

/// Shared-token bearer check, registered as a function middleware: a request
/// without the expected `authorization` header is rejected with a 401 before
/// anything downstream runs.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl FunctionMiddleware for AuthMiddleware {
    fn call(
        &self,
        req: &mut RouterRequest,
        _ctx: &mut Context,
    ) -> Result<Option<RouterResponse>, anyhow::Error> {
        match req.get_header("authorization") {
            Some(h) if h == self.token => Ok(None),
            _ => Ok(Some(RouterResponse::json(
                401,
                serde_json::json!({ "error": "Unauthorized" }),
            ))),
        }
    }
}

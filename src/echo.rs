use crate::pipeline::{Context, RouterRequest, RouterResponse};

// Example handler: echoes the request back, used by tests and demos.
pub fn echo_handler(
    req: &RouterRequest,
    _ctx: &mut Context,
) -> Result<RouterResponse, anyhow::Error> {
    Ok(RouterResponse::json(
        200,
        serde_json::json!({
            "method": req.method.to_string(),
            "url": req.url,
            "params": req.path_params_map(),
            "body": req.body,
        }),
    ))
}

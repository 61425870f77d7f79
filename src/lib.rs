//! # Switchyard
//!
//! **Switchyard** is a request-routing library: it matches an incoming
//! HTTP-style request to a registered handler and runs that handler through
//! an ordered, composable pipeline of middleware.
//!
//! ## Overview
//!
//! The core of the crate is the middleware execution coordinator:
//! path/parameter matching, two middleware calling conventions,
//! short-circuiting, per-request context propagation, automatic redirect
//! synthesis when middleware rewrites the request target, and prefix-scoped
//! middleware composition across mounted sub-routers.
//!
//! The HTTP transport is deliberately out of scope: an embedding server
//! parses the wire request into a [`RouterRequest`], calls
//! [`Router::dispatch`] once per inbound request, and writes the returned
//! [`RouterResponse`] back out. Uncaught errors propagate to that caller
//! unmodified so the transport decides how to surface them.
//!
//! ## Architecture
//!
//! - **[`router`]** - path templates (`/pets/:id`), the ordered route table,
//!   the chaining registration API, and mount composition
//! - **[`middleware`]** - the `Function`/`Wrapping` calling conventions and
//!   the stock middleware (auth, CORS, metrics, tracing)
//! - **[`dispatcher`]** - the execution coordinator and its error taxonomy
//! - **[`pipeline`]** - request/response descriptors and the typed per-request
//!   [`Context`](pipeline::Context)
//! - **[`cache`]** - the cache collaborator contract and the named-cache
//!   registry
//! - **[`ids`]** - ULID request identifiers for log correlation
//! - **[`runtime_config`]** - environment-driven runtime knobs
//!
//! ## Dispatch flow
//!
//! `dispatch` creates a fresh context, captures the original URL, and drives
//! the middleware chain from index 0:
//!
//! 1. Entries scoped to a path prefix are skipped unless the current request
//!    path sits on a segment boundary under the prefix.
//! 2. A function middleware may short-circuit with a response; otherwise the
//!    chain continues and the downstream result passes through untouched.
//! 3. A wrapping middleware runs before-logic, may rewrite the request, then
//!    delegates via [`Next`](dispatcher::Next); its after-logic sees (and may
//!    mutate) the downstream response, and a downstream failure surfaces at
//!    the delegation point where it can be caught.
//! 4. With the stack exhausted, the terminal step synthesizes a 301/302/307
//!    redirect if the URL was rewritten (rejecting cross-origin or
//!    unparseable rewrites), otherwise looks up the route table and falls
//!    back to a `"Not Found"` 404.
//!
//! ## Quick start
//!
//! ```
//! use switchyard::middleware::TracingMiddleware;
//! use switchyard::pipeline::{Context, RouterRequest, RouterResponse};
//! use switchyard::Router;
//!
//! fn show_pet(req: &RouterRequest, _ctx: &mut Context) -> Result<RouterResponse, anyhow::Error> {
//!     Ok(RouterResponse::json(
//!         200,
//!         serde_json::json!({ "id": req.get_path_param("id") }),
//!     ))
//! }
//!
//! let mut router = Router::new();
//! router.use_wrap(TracingMiddleware);
//! router.route("/pets/:id").get(show_pet);
//!
//! let res = router.dispatch(RouterRequest::get("http://localhost/pets/42")).unwrap();
//! assert_eq!(res.status, 200);
//! ```
//!
//! ## Runtime considerations
//!
//! Dispatch is a plain synchronous function with strict per-request
//! sequencing: one logical thread of control per request, before-phases in
//! registration order, after-phases unwinding in exact reverse order of the
//! delegations. Embedders that want many concurrent requests run one
//! dispatch per task on their cooperative runtime (the `may` coroutine
//! runtime in the reference deployment); nothing in the pipeline blocks on
//! another request.
//!
//! No cancellation or timeout policy is implemented in this core; deadlines
//! belong to the embedding transport layer.

pub mod cache;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod middleware;
pub mod pipeline;
pub mod router;
pub mod runtime_config;

pub use dispatcher::{DispatchError, Next};
pub use ids::RequestId;
pub use pipeline::{Context, HeaderVec, RouterRequest, RouterResponse};
pub use router::{Handler, MethodFilter, ParamVec, PathPattern, RouteBuilder, Router, RouterStats};

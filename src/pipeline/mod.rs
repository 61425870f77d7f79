//! # Pipeline Module
//!
//! Per-request state threaded through the middleware chain: the request and
//! response descriptors and the typed [`Context`] bag.
//!
//! A fresh `Context` is created for every top-level
//! [`dispatch`](crate::router::Router::dispatch) call and passed by `&mut`
//! reference to every middleware and handler servicing that request,
//! including those contributed by mounted sub-routers. It is dropped when
//! dispatch returns; exactly one logical execution ever touches it.

mod context;
mod request;
mod response;

pub use context::{Context, ContextKey};
pub use request::{HeaderVec, RouterRequest, MAX_INLINE_HEADERS};
pub use response::RouterResponse;

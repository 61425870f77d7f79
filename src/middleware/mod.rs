//! # Middleware Module
//!
//! The two middleware calling conventions and the stock middleware shipped
//! with the router.
//!
//! A middleware registers as one of two explicit kinds:
//!
//! - **Function** ([`FunctionMiddleware`]): pre-only. Runs before anything
//!   downstream; returning a response short-circuits the chain, returning
//!   `None` continues. It never observes the downstream response.
//! - **Wrapping** ([`WrappingMiddleware`]): wraps the downstream call via a
//!   [`Next`](crate::dispatcher::Next) continuation. Before-logic runs ahead
//!   of the delegation, after-logic on its return value, and matching the
//!   `Err` arm of the delegation catches downstream failures.
//!
//! The kind is fixed at registration time as a tagged [`Middleware`] variant;
//! nothing is inferred from the registered value's shape at dispatch time.
//!
//! An entry may be scoped to a path prefix; scoping is segment-boundary
//! (`/admin` covers `/admin` and `/admin/users`, never `/administrator`).

mod auth;
mod core;
mod cors;
mod metrics;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::{FunctionMiddleware, Middleware, MiddlewareEntry, WrappingMiddleware};
pub use cors::{CorsMiddleware, OriginValidation};
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;

//! # Router Module
//!
//! Path matching, the ordered route table, and the [`Router`] composition
//! root that owns one middleware stack, one route table, and the mount
//! composition.
//!
//! ## Overview
//!
//! Routing is a two-phase affair:
//!
//! 1. **Compilation**: at registration time, path templates
//!    (e.g. `/pets/:id`) are compiled into anchored regex matchers that
//!    extract named parameters.
//! 2. **Matching**: at the coordinator's terminal step, the request path is
//!    tested against the compiled patterns in registration order; the first
//!    pattern whose matcher succeeds *and* whose method filter accepts the
//!    request method wins.
//!
//! The scan is deliberately ordered rather than tree-shaped: first-registered,
//! first-matched is part of the routing contract, not an implementation
//! detail.

mod builder;
mod core;
mod pattern;

#[cfg(test)]
mod tests;

pub use builder::RouteBuilder;
pub use core::{Handler, MethodFilter, Route, RouteTable, Router, RouterStats};
pub use pattern::{ParamVec, PathPattern, MAX_INLINE_PARAMS};

//! # Dispatcher Module
//!
//! The execution coordinator: the recursive driver that threads one request
//! through the middleware stack and, at the terminal step, through the route
//! table.
//!
//! ## Control flow
//!
//! `Router::dispatch` starts the coordinator at middleware index 0. Each
//! step:
//!
//! 1. skips the entry when its path prefix does not apply to the current
//!    request path (segment-boundary matching);
//! 2. invokes a function middleware; a returned response short-circuits the
//!    whole chain, `None` continues;
//! 3. hands a wrapping middleware a [`Next`] continuation. Work done before
//!    `next.run(...)` is the before-phase; the after-phase operates on its
//!    return value. Because the continuation drives the rest of the chain,
//!    after-phases unwind in exact reverse registration order of the
//!    delegations, and a downstream failure surfaces exactly at the
//!    delegation point where a middleware may catch it.
//!
//! When the stack is exhausted, the terminal step compares the current
//! request URL against the one originally supplied to dispatch. A rewrite
//! same-origin (or upgraded http→https) becomes a synthesized 301/302/307
//! redirect that still unwinds through every pending after-phase; a
//! cross-origin or unparseable rewrite is an error. Otherwise the route
//! table is consulted and an unmatched request yields the literal
//! `"Not Found"` 404.

mod core;

pub use core::{DispatchError, Next};

pub(crate) use core::run;

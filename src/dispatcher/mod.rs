//! # Dispatcher Module
//!
//! A minimal host for middleware: it owns the request/response types the
//! middleware chain operates on and runs the chain around a single handler.
//!
//! ## Request Flow
//!
//! 1. A fresh [`HandlerResponse`] (200, no headers, null body) is created
//! 2. Each middleware's `before` hook runs against the request and that response
//! 3. If every hook returned [`Flow::Continue`](crate::middleware::Flow), the handler runs
//!    and writes into the same response, so headers set by middleware are kept
//! 4. Every middleware's `after` hook runs with the measured latency
//!
//! Routing, body parsing and the network server are not part of this crate;
//! the dispatcher is what an embedding server calls once it has built a
//! [`HandlerRequest`].

mod core;

pub use self::core::{Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS};

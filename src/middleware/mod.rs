//! # Middleware Module
//!
//! Interceptors run by the [`Dispatcher`](crate::dispatcher::Dispatcher)
//! around each handler invocation.
//!
//! - [`CorsMiddleware`] - CORS negotiation backed by a [`CorsPolicy`]
//! - [`TracingMiddleware`] - one log event per completed request

mod core;
pub mod cors;
mod tracing;

pub use self::core::{Flow, Middleware};
pub use self::tracing::TracingMiddleware;
pub use cors::{
    AllowList, CorsConfigError, CorsError, CorsMiddleware, CorsOutcome, CorsPolicy,
    CorsPolicyBuilder, OriginValidator, RequestHead, ResponseSink,
};

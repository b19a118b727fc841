use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// What the dispatcher does after a middleware's `before` hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the remaining middleware and then the handler
    Continue,
    /// The response is final; skip the handler and any later `before` hooks
    Respond,
}

/// Request/response interceptor run by the [`Dispatcher`](crate::dispatcher::Dispatcher)
///
/// `before` receives the response the handler will later write into, so
/// headers set there survive into the final response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest, _res: &mut HandlerResponse) -> Flow {
        Flow::Continue
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}

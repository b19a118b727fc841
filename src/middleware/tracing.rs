use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs one event per completed request with its status and latency
///
/// Client errors (4xx) are logged at `warn`, everything else at `info`.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        if (400..500).contains(&res.status) {
            warn!(
                method = %req.method,
                path = %req.path,
                status = res.status,
                latency_us,
                "request rejected"
            );
        } else {
            info!(
                method = %req.method,
                path = %req.path,
                status = res.status,
                latency_us,
                "request completed"
            );
        }
    }
}

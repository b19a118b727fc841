//! Cross-Origin Resource Sharing negotiation.
//!
//! [`CorsPolicy::evaluate`] is the whole protocol: it validates the `Origin`,
//! writes the grant headers, answers preflight requests with `204` and
//! reports rejections as [`CorsError`]. [`CorsMiddleware`] plugs a policy into
//! the [`Dispatcher`](crate::dispatcher::Dispatcher) middleware chain.
//!
//! ```mermaid
//! flowchart TD
//!     A[Vary: Origin] --> B{Origin present?}
//!     B -- no --> P[continue, not CORS]
//!     B -- yes --> C{validator accepts?}
//!     C -- no --> E1[403 OriginRejected]
//!     C -- yes --> D[Allow-Credentials?, Allow-Origin]
//!     D --> F{OPTIONS?}
//!     F -- no --> G[Expose-Headers?, continue]
//!     F -- yes --> H{Access-Control-Request-Method?}
//!     H -- no --> E2[remove grant, 403 InvalidPreflight]
//!     H -- yes --> I[Allow-Methods, Allow-Headers, Max-Age, 204, end]
//! ```

mod builder;
mod error;
mod host;
mod policy;
mod validator;
mod vary;

pub use builder::CorsPolicyBuilder;
pub use error::{CorsConfigError, CorsError};
pub use host::{RequestHead, ResponseSink};
pub use policy::{CorsOutcome, CorsPolicy};
pub use validator::{AllowList, OriginValidator};

pub(crate) use vary::merge as merge_vary;

use std::sync::Arc;

use super::{Flow, Middleware};
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// CORS middleware
///
/// Runs [`CorsPolicy::evaluate`] before the handler:
///
/// - Non-CORS and simple requests continue to the handler with the grant
///   headers already on the response.
/// - Preflight requests are answered with `204` and the handler is skipped.
/// - Rejected origins and invalid preflights become a `403` JSON error
///   (`{"error": "<message>"}`); headers written before the failure, such as
///   `Vary`, are kept.
///
/// # Usage
///
/// ```rust
/// use std::sync::Arc;
/// use preflight::dispatcher::Dispatcher;
/// use preflight::middleware::{CorsMiddleware, CorsPolicyBuilder};
///
/// let policy = CorsPolicyBuilder::new()
///     .allow_origins(&["https://example.com"])
///     .build()
///     .expect("valid CORS configuration");
///
/// let mut dispatcher = Dispatcher::new(|_req, res| res.body = serde_json::json!("ok"));
/// dispatcher.add_middleware(Arc::new(CorsMiddleware::new(policy)));
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    policy: Arc<CorsPolicy>,
}

impl CorsMiddleware {
    #[must_use]
    pub fn new(policy: CorsPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Wrap a policy that is also used elsewhere
    #[must_use]
    pub fn from_shared(policy: Arc<CorsPolicy>) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Flow {
        match self.policy.evaluate(req, res) {
            Ok(outcome) if outcome.is_terminal() => Flow::Respond,
            Ok(_) => Flow::Continue,
            Err(err) => {
                res.fail(err.status().as_u16(), &err.to_string());
                Flow::Respond
            }
        }
    }
}

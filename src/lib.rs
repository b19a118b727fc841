//! # preflight
//!
//! **preflight** implements Cross-Origin Resource Sharing (CORS) negotiation as a
//! request/response interceptor. Given an inbound request and a configured
//! [`CorsPolicy`], it decides whether the requesting origin is permitted, writes
//! the CORS response headers and short-circuits preflight (`OPTIONS`) requests
//! with a `204 No Content`.
//!
//! ## Architecture
//!
//! - **[`middleware::cors`]** - the policy, its builder, origin validators and the
//!   [`RequestHead`]/[`ResponseSink`] traits a host implements
//! - **[`dispatcher`]** - a small host that runs middleware around a handler
//! - **[`config`]** - YAML/JSON configuration with environment overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `preflight` binary for evaluating policies offline
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Dispatcher
//!     participant Cors as CorsMiddleware
//!     participant Policy as CorsPolicy
//!     participant Handler
//!
//!     Client->>Dispatcher: OPTIONS /items<br/>Origin: https://app.test
//!     Dispatcher->>Cors: before(req, res)
//!     Cors->>Policy: evaluate(req, res)
//!     Policy->>Policy: Vary: Origin
//!     Policy->>Policy: validator(origin)
//!     alt Origin rejected
//!         Policy-->>Cors: Err(OriginRejected)
//!         Cors-->>Client: 403 {"error": ...}
//!     end
//!     Policy->>Policy: Allow-Origin / Allow-Credentials
//!     alt Preflight
//!         Policy->>Policy: Allow-Methods, Allow-Headers, Max-Age
//!         Policy-->>Cors: Ok(Preflight)
//!         Cors-->>Client: 204 No Content
//!     else Actual request
//!         Policy-->>Cors: Ok(Simple)
//!         Dispatcher->>Handler: handler(req, res)
//!         Handler-->>Client: 200 + CORS headers
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use preflight::middleware::CorsPolicyBuilder;
//!
//! let policy = CorsPolicyBuilder::new()
//!     .allow_origins(&["https://app.example.com"])
//!     .allow_methods(&["GET", "PUT"])
//!     .max_age(600)
//!     .build()
//!     .expect("valid CORS configuration");
//!
//! let req = http::Request::builder()
//!     .method("OPTIONS")
//!     .header("Origin", "https://app.example.com")
//!     .header("Access-Control-Request-Method", "PUT")
//!     .body(())
//!     .unwrap();
//! let mut res = http::Response::new(String::new());
//!
//! let outcome = policy.evaluate(&req, &mut res).unwrap();
//! assert!(outcome.is_terminal());
//! assert_eq!(res.status(), http::StatusCode::NO_CONTENT);
//! assert_eq!(res.headers()["access-control-allow-methods"], "GET, PUT");
//! ```
//!
//! ## Credentials
//!
//! A browser rejects a credentialed response whose `Access-Control-Allow-Origin`
//! is `*`. The default validator always echoes the request origin, never `*`,
//! but a custom validator may return anything. Do not combine `credentials`
//! with a validator that can answer `*`; the policy does not check it.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod middleware;

pub use config::{load_config, CorsConfig};
pub use middleware::{
    CorsConfigError, CorsError, CorsOutcome, CorsPolicy, CorsPolicyBuilder, OriginValidator,
    RequestHead, ResponseSink,
};

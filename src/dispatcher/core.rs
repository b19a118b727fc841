use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, info_span};

use crate::middleware::cors::merge_vary;
use crate::middleware::{Flow, Middleware, RequestHead, ResponseSink};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` so well-known names can be shared cheaply.
/// Order of insertion is preserved.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data handed to middleware and the handler
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, OPTIONS, etc.)
    pub method: Method,
    /// Request path
    pub path: String,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
}

impl HandlerRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderVec::new(),
        }
    }

    /// Append a header, builder style
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl RequestHead for HandlerRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get_header(name).map(Cow::Borrowed)
    }
}

/// Response under construction
///
/// Created by the dispatcher before the middleware chain runs and mutated in
/// place by middleware and the handler.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    /// HTTP status code (200, 204, 403, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body as JSON; `Null` means empty
    pub body: Value,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), Value::Null)
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Remove a header if present
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Turn this response into a JSON error, keeping headers already set
    pub fn fail(&mut self, status: u16, message: &str) {
        self.status = status;
        self.set_header("content-type", "application/json".to_string());
        self.body = serde_json::json!({ "error": message });
    }
}

impl ResponseSink for HandlerResponse {
    fn append_vary(&mut self, field: &str) {
        if let Some(merged) = merge_vary(self.get_header("vary"), field) {
            self.set_header("vary", merged);
        }
    }

    fn set_header(&mut self, name: &str, value: &str) {
        HandlerResponse::set_header(self, name, value.to_string());
    }

    fn remove_header(&mut self, name: &str) {
        HandlerResponse::remove_header(self, name);
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status.as_u16();
    }

    fn end(&mut self) {
        self.body = Value::Null;
    }
}

/// Application handler invoked when every middleware lets the request through
pub type Handler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync>;

/// Runs the middleware chain around a handler
///
/// The dispatcher holds no per-request state; `dispatch` can be called from
/// any number of threads at once.
pub struct Dispatcher {
    middlewares: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

impl Dispatcher {
    /// Create a dispatcher with no middleware around `handler`
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        Self {
            middlewares: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append a middleware; hooks run in registration order
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Process one request through the middleware chain and the handler
    #[must_use]
    pub fn dispatch(&self, req: &HandlerRequest) -> HandlerResponse {
        let span = info_span!("request", method = %req.method, path = %req.path);
        let _entered = span.enter();
        let start = Instant::now();

        let mut res = HandlerResponse::default();
        let mut flow = Flow::Continue;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            flow = mw.before(req, &mut res);
            if flow == Flow::Respond {
                debug!(middleware_index = idx, status = res.status, "Middleware short-circuited request");
                break;
            }
        }

        if flow == Flow::Continue {
            (self.handler)(req, &mut res);
        }

        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(req, &mut res, latency);
        }
        res
    }
}

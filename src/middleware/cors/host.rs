//! The request/response surface a host HTTP layer exposes to [`CorsPolicy`].
//!
//! [`CorsPolicy::evaluate`] never touches a concrete request or response
//! type. It reads the request through [`RequestHead`] and writes through
//! [`ResponseSink`], so the same policy runs inside the crate's own
//! [`Dispatcher`](crate::dispatcher::Dispatcher) and against plain
//! [`http::Request`] / [`http::Response`] values.
//!
//! [`CorsPolicy`]: super::CorsPolicy
//! [`CorsPolicy::evaluate`]: super::CorsPolicy::evaluate

use std::borrow::Cow;

use http::header::{HeaderName, HeaderValue, VARY};
use http::{Method, StatusCode};
use tracing::warn;

use super::vary;

/// Read access to the parts of an inbound request CORS cares about.
pub trait RequestHead {
    /// The request method.
    fn method(&self) -> &Method;

    /// Look up a request header, case-insensitively.
    ///
    /// Implementations return `None` only for absent headers. A value that is
    /// present but not valid UTF-8 is returned lossily decoded, never hidden.
    /// Callers treat an empty value the same as an absent one.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Write access to the response under construction.
///
/// Writes are applied in place and are visible to later reads within the
/// same evaluation.
pub trait ResponseSink {
    /// Add `field` to the `Vary` header unless it is already listed.
    fn append_vary(&mut self, field: &str);

    /// Set `name` to exactly `value`, replacing any previous value.
    fn set_header(&mut self, name: &str, value: &str);

    /// Remove `name` if present.
    fn remove_header(&mut self, name: &str);

    /// Set the response status code.
    fn set_status(&mut self, status: StatusCode);

    /// Finish the response with an empty body. Nothing downstream runs.
    fn end(&mut self);
}

impl<B> RequestHead for http::Request<B> {
    fn method(&self) -> &Method {
        http::Request::method(self)
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers().get(name).map(decode)
    }
}

impl RequestHead for http::request::Parts {
    fn method(&self) -> &Method {
        &self.method
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers.get(name).map(decode)
    }
}

fn decode(value: &HeaderValue) -> Cow<'_, str> {
    String::from_utf8_lossy(value.as_bytes())
}

impl<B: Default> ResponseSink for http::Response<B> {
    fn append_vary(&mut self, field: &str) {
        // Several Vary lines are legal; fold them into one before merging.
        let existing = self
            .headers()
            .get_all(VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        let existing = (!existing.is_empty()).then_some(existing.as_str());

        if let Some(merged) = vary::merge(existing, field) {
            match HeaderValue::from_str(&merged) {
                Ok(value) => {
                    self.headers_mut().insert(VARY, value);
                }
                Err(_) => warn!(value = %merged, "CORS: unrepresentable Vary value"),
            }
        }
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(_) => {
                warn!(header = name, "CORS: invalid response header name");
                return;
            }
        };
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers_mut().insert(name, v);
            }
            Err(_) => warn!(header = %name, value, "CORS: invalid response header value"),
        }
    }

    fn remove_header(&mut self, name: &str) {
        self.headers_mut().remove(name);
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn end(&mut self) {
        *self.body_mut() = B::default();
    }
}

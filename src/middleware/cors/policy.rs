use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use http::HeaderValue;
use http::{Method, StatusCode};
use tracing::{debug, warn};

use super::{CorsError, OriginValidator, RequestHead, ResponseSink};

// Vary values are written with their canonical casing.
const VARY_ORIGIN: &str = "Origin";
const VARY_REQUEST_METHOD: &str = "Access-Control-Request-Method";
const VARY_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

/// How a successful evaluation left the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsOutcome {
    /// No `Origin` header; only `Vary: Origin` was written
    NotCors,
    /// Actual cross-origin request; grant headers written, processing continues
    Simple,
    /// Preflight answered with `204 No Content`; the response is finished
    Preflight,
}

impl CorsOutcome {
    /// `true` when the response is complete and no handler may run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CorsOutcome::Preflight)
    }
}

/// Immutable CORS access policy
///
/// Built once at startup through [`CorsPolicyBuilder`](super::CorsPolicyBuilder)
/// and shared read-only (typically behind an `Arc`) by every request.
/// Header values derived from the configuration are joined at build time, so
/// [`evaluate`](Self::evaluate) only copies strings into the response.
///
/// # Credentials and wildcards
///
/// Browsers refuse credentialed responses whose `Access-Control-Allow-Origin`
/// is `*`. The policy does not prevent a custom validator from returning `*`
/// while `credentials` is enabled; keeping the two apart is up to whoever
/// writes the policy.
pub struct CorsPolicy {
    pub(crate) validator: Arc<dyn OriginValidator>,
    pub(crate) allow_credentials: bool,
    pub(crate) allow_methods: Option<String>,
    pub(crate) allow_headers: Option<String>,
    pub(crate) expose_headers: Option<String>,
    pub(crate) max_age: Option<String>,
}

impl fmt::Debug for CorsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorsPolicy")
            .field("validator", &"<validator>")
            .field("allow_credentials", &self.allow_credentials)
            .field("allow_methods", &self.allow_methods)
            .field("allow_headers", &self.allow_headers)
            .field("expose_headers", &self.expose_headers)
            .field("max_age", &self.max_age)
            .finish()
    }
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<Cow<'_, str>> {
    value.filter(|v| !v.is_empty())
}

impl CorsPolicy {
    /// Whether responses advertise `Access-Control-Allow-Credentials: true`.
    #[must_use]
    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Negotiate CORS for one request.
    ///
    /// Writes through `res` in this order:
    ///
    /// 1. `Vary: Origin`, always.
    /// 2. Nothing else when the request has no `Origin` ([`CorsOutcome::NotCors`]).
    /// 3. `Access-Control-Allow-Credentials` (if enabled) and
    ///    `Access-Control-Allow-Origin` once the validator accepts the origin.
    /// 4. For `OPTIONS`: the preflight header set, status 204 and
    ///    [`ResponseSink::end`] ([`CorsOutcome::Preflight`]).
    /// 5. Otherwise: `Access-Control-Expose-Headers` if configured
    ///    ([`CorsOutcome::Simple`]).
    ///
    /// # Errors
    ///
    /// - [`CorsError::OriginRejected`] when the validator declines the origin
    ///   or answers with a value that is not a legal header value. No grant
    ///   header has been written at that point.
    /// - [`CorsError::InvalidPreflight`] for an `OPTIONS` request without
    ///   `Access-Control-Request-Method`. The grant headers from step 3 are
    ///   removed again before returning.
    ///
    /// Either error means the host must respond with the error's status and
    /// skip the application handler.
    pub fn evaluate<Q, S>(&self, req: &Q, res: &mut S) -> Result<CorsOutcome, CorsError>
    where
        Q: RequestHead,
        S: ResponseSink + ?Sized,
    {
        res.append_vary(VARY_ORIGIN);

        let origin = match non_empty(req.header(ORIGIN.as_str())) {
            Some(o) => o,
            None => {
                debug!("CORS: no Origin header, not a CORS request");
                return Ok(CorsOutcome::NotCors);
            }
        };

        let origin = &*origin;
        let allowed_origin = match self.validator.allow_origin(origin, req) {
            Some(o) if o.is_empty() => None,
            Some(o) if HeaderValue::from_str(&o).is_err() => {
                warn!(origin, "CORS: validator returned an invalid header value");
                None
            }
            other => other,
        };
        let allowed_origin = match allowed_origin {
            Some(o) => o,
            None => {
                warn!(origin, "CORS: origin rejected");
                return Err(CorsError::OriginRejected {
                    origin: origin.to_string(),
                });
            }
        };

        if self.allow_credentials {
            res.set_header(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str(), "true");
        }
        res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), &allowed_origin);

        if req.method() == Method::OPTIONS {
            return self.preflight(req, res, origin);
        }

        if let Some(exposed) = &self.expose_headers {
            res.set_header(ACCESS_CONTROL_EXPOSE_HEADERS.as_str(), exposed);
        }
        debug!(origin, allowed_origin = %allowed_origin, "CORS: simple request granted");
        Ok(CorsOutcome::Simple)
    }

    fn preflight<Q, S>(&self, req: &Q, res: &mut S, origin: &str) -> Result<CorsOutcome, CorsError>
    where
        Q: RequestHead,
        S: ResponseSink + ?Sized,
    {
        res.append_vary(VARY_REQUEST_METHOD);
        res.append_vary(VARY_REQUEST_HEADERS);

        let requested_method = match non_empty(req.header(ACCESS_CONTROL_REQUEST_METHOD.as_str())) {
            Some(m) => m,
            None => {
                res.remove_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str());
                res.remove_header(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str());
                warn!(origin, "CORS preflight: missing Access-Control-Request-Method");
                return Err(CorsError::InvalidPreflight);
            }
        };

        if let Some(methods) = &self.allow_methods {
            res.set_header(ACCESS_CONTROL_ALLOW_METHODS.as_str(), methods);
        }

        let allow_headers = match &self.allow_headers {
            Some(configured) => Some(Cow::Borrowed(configured.as_str())),
            None => non_empty(req.header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()))
                .filter(|h| HeaderValue::from_str(h).is_ok()),
        };
        if let Some(headers) = allow_headers {
            res.set_header(ACCESS_CONTROL_ALLOW_HEADERS.as_str(), &headers);
        }

        if let Some(max_age) = &self.max_age {
            res.set_header(ACCESS_CONTROL_MAX_AGE.as_str(), max_age);
        }

        res.set_status(StatusCode::NO_CONTENT);
        res.end();
        debug!(origin, requested_method = %requested_method, "CORS preflight: answered with 204");
        Ok(CorsOutcome::Preflight)
    }
}

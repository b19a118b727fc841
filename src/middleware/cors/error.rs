use std::fmt;

use http::StatusCode;

/// Per-request CORS failure
///
/// Returned by [`CorsPolicy::evaluate`](super::CorsPolicy::evaluate). Both
/// variants are terminal: the host must answer with [`CorsError::status`]
/// and must not run the application handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsError {
    /// The origin validator declined the request's `Origin`
    OriginRejected {
        /// The literal `Origin` header value
        origin: String,
    },
    /// An `OPTIONS` request carried an `Origin` but no
    /// `Access-Control-Request-Method`
    ///
    /// Any grant headers written before the check have been removed from the
    /// response by the time this error is returned.
    InvalidPreflight,
}

impl CorsError {
    /// HTTP status to answer with. Always `403 Forbidden`.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }
}

impl fmt::Display for CorsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsError::OriginRejected { origin } => {
                write!(f, "Origin \"{}\" is not allowed", origin)
            }
            CorsError::InvalidPreflight => write!(
                f,
                "invalid preflighted request, missing Access-Control-Request-Method header"
            ),
        }
    }
}

impl std::error::Error for CorsError {}

/// CORS configuration error
///
/// Returned by `CorsPolicyBuilder::build()` when a configured token cannot be
/// used in an HTTP header. Never produced while evaluating requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// A method in `allow_methods` is not a valid HTTP method token
    InvalidMethod {
        /// The offending method string
        method: String,
    },
    /// A name in `allow_headers` or `expose_headers` is not a valid header name
    InvalidHeaderName {
        /// The offending header name
        name: String,
    },
    /// An entry in `allow_origin_patterns` failed to compile
    InvalidOriginPattern {
        /// The pattern as configured
        pattern: String,
        /// Compiler message from `regex`
        reason: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::InvalidMethod { method } => {
                write!(
                    f,
                    "CORS configuration error: '{}' is not a valid HTTP method token",
                    method
                )
            }
            CorsConfigError::InvalidHeaderName { name } => {
                write!(
                    f,
                    "CORS configuration error: '{}' is not a valid header name",
                    name
                )
            }
            CorsConfigError::InvalidOriginPattern { pattern, reason } => {
                write!(
                    f,
                    "CORS configuration error: invalid origin pattern '{}': {}",
                    pattern, reason
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}

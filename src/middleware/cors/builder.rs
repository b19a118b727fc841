use std::sync::Arc;

use http::header::HeaderName;
use http::Method;
use regex::Regex;
use tracing::warn;

use super::{AllowList, CorsConfigError, CorsPolicy, OriginValidator, RequestHead};
use crate::config::CorsConfig;

/// Builder for creating [`CorsPolicy`] with a fluent API
///
/// Starts from the same defaults as [`CorsConfig::default`]:
///
/// - `allow_origins`: `["*"]`
/// - `allow_methods`: `GET, HEAD, PUT, POST, DELETE, PATCH`
/// - `allow_headers`: empty (echo `Access-Control-Request-Headers`)
/// - `expose_headers`: empty
/// - `max_age`: `0` (not advertised)
/// - `credentials`: `false`
///
/// # Example
///
/// ```rust
/// use preflight::middleware::CorsPolicyBuilder;
///
/// let policy = CorsPolicyBuilder::new()
///     .allow_origins(&["https://example.com"])
///     .allow_methods(&["GET", "PUT"])
///     .allow_headers(&["Content-Type", "X-Request-Id"])
///     .expose_headers(&["X-Total-Count"])
///     .max_age(600)
///     .credentials(true)
///     .build()
///     .expect("valid CORS configuration");
/// assert!(policy.allow_credentials());
/// ```
pub struct CorsPolicyBuilder {
    allow_origins: Vec<String>,
    allow_origin_patterns: Vec<String>,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    expose_headers: Vec<String>,
    max_age: u64,
    credentials: bool,
    validator: Option<Arc<dyn OriginValidator>>,
}

impl CorsPolicyBuilder {
    /// Create a builder holding the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CorsConfig::default())
    }

    /// Create a builder seeded from a loaded configuration
    #[must_use]
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            allow_origins: config.allow_origins.clone(),
            allow_origin_patterns: config.allow_origin_patterns.clone(),
            allow_methods: config.allow_methods.clone(),
            allow_headers: config.allow_headers.clone(),
            expose_headers: config.expose_headers.clone(),
            max_age: config.max_age,
            credentials: config.credentials,
            validator: None,
        }
    }

    /// Set allowed origins
    ///
    /// `"*"` accepts every origin; the request origin is still echoed back
    /// verbatim rather than `*`. Ignored once a custom validator is set.
    #[must_use]
    pub fn allow_origins(mut self, origins: &[&str]) -> Self {
        self.allow_origins = origins.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Accept origins matching any of these regular expressions
    ///
    /// Patterns are compiled by [`build`](Self::build). Anchor them
    /// (`^...$`); an unanchored pattern matches substrings.
    #[must_use]
    pub fn allow_origin_patterns(mut self, patterns: &[&str]) -> Self {
        self.allow_origin_patterns = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the methods advertised in `Access-Control-Allow-Methods`
    ///
    /// Order is preserved and duplicates are kept. An empty slice stops the
    /// header from being sent.
    #[must_use]
    pub fn allow_methods(mut self, methods: &[&str]) -> Self {
        self.allow_methods = methods.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the headers advertised in `Access-Control-Allow-Headers`
    ///
    /// With an empty slice, preflight responses echo the request's
    /// `Access-Control-Request-Headers` instead.
    #[must_use]
    pub fn allow_headers(mut self, headers: &[&str]) -> Self {
        self.allow_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set headers exposed to scripts on actual (non-preflight) responses
    #[must_use]
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set preflight cache duration in seconds; `0` disables the header
    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Enable or disable `Access-Control-Allow-Credentials: true`
    #[must_use]
    pub fn credentials(mut self, allow: bool) -> Self {
        self.credentials = allow;
        self
    }

    /// Replace origin acceptance with a closure
    ///
    /// The closure returns the `Access-Control-Allow-Origin` value, or `None`
    /// to reject. It has full authority: `allow_origins` and
    /// `allow_origin_patterns` are no longer consulted.
    ///
    /// ```rust
    /// use preflight::middleware::{CorsPolicyBuilder, RequestHead};
    ///
    /// let policy = CorsPolicyBuilder::new()
    ///     .origin_validator(|origin: &str, _req: &dyn RequestHead| {
    ///         (origin != "https://blocked.test").then(|| "https://canonical.test".to_string())
    ///     })
    ///     .build()
    ///     .unwrap();
    /// # let _ = policy;
    /// ```
    #[must_use]
    pub fn origin_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &dyn RequestHead) -> Option<String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Replace origin acceptance with any [`OriginValidator`] implementation
    #[must_use]
    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: OriginValidator + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Build the policy
    ///
    /// Validates every configured token and joins the header values once, so
    /// evaluation never re-parses configuration.
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::InvalidMethod`] for a method that is not an HTTP token
    /// - [`CorsConfigError::InvalidHeaderName`] for an invalid allow/expose header
    /// - [`CorsConfigError::InvalidOriginPattern`] for a pattern that fails to compile
    pub fn build(self) -> Result<CorsPolicy, CorsConfigError> {
        for method in &self.allow_methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(CorsConfigError::InvalidMethod {
                    method: method.clone(),
                });
            }
        }
        for name in self.allow_headers.iter().chain(&self.expose_headers) {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(CorsConfigError::InvalidHeaderName { name: name.clone() });
            }
        }

        let validator: Arc<dyn OriginValidator> = match self.validator {
            Some(custom) => custom,
            None => {
                let patterns = self
                    .allow_origin_patterns
                    .iter()
                    .map(|p| {
                        Regex::new(p).map_err(|e| CorsConfigError::InvalidOriginPattern {
                            pattern: p.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let list = AllowList::new(self.allow_origins, patterns);
                if self.credentials && list.is_wildcard() {
                    warn!(
                        "CORS: credentials are enabled together with a wildcard origin; \
                        every origin will receive credentialed grants"
                    );
                }
                Arc::new(list)
            }
        };

        Ok(CorsPolicy {
            validator,
            allow_credentials: self.credentials,
            allow_methods: join(&self.allow_methods),
            allow_headers: join(&self.allow_headers),
            expose_headers: join(&self.expose_headers),
            max_age: (self.max_age > 0).then(|| self.max_age.to_string()),
        })
    }
}

impl Default for CorsPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn join(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(", "))
}

//! # Configuration Module
//!
//! Loads the CORS policy configuration from YAML or JSON and overlays
//! environment variables.
//!
//! Every field is optional; missing fields take the defaults below, so a
//! file only lists what it changes:
//!
//! | Field | Default |
//! |---|---|
//! | `allow_origins` | `["*"]` |
//! | `allow_origin_patterns` | `[]` |
//! | `allow_methods` | `["GET", "HEAD", "PUT", "POST", "DELETE", "PATCH"]` |
//! | `allow_headers` | `[]` (echo `Access-Control-Request-Headers`) |
//! | `expose_headers` | `[]` |
//! | `max_age` | `0` (not advertised) |
//! | `credentials` | `false` |
//!
//! ## Example Configuration
//!
//! ```yaml
//! cors:
//!   allow_origins: ["https://app.example.com"]
//!   allow_headers: ["Content-Type", "Authorization"]
//!   expose_headers: ["X-Total-Count"]
//!   max_age: 600
//!   credentials: true
//! ```
//!
//! The `cors:` wrapper is optional, so the section can live inside a larger
//! service configuration file or stand alone.
//!
//! ## Environment Variables
//!
//! Applied by [`CorsConfig::apply_env_overrides`] on top of the file:
//!
//! - `PREFLIGHT_CORS_ALLOW_ORIGINS` - comma-separated list
//! - `PREFLIGHT_CORS_ALLOW_METHODS` - comma-separated list
//! - `PREFLIGHT_CORS_ALLOW_HEADERS` - comma-separated list
//! - `PREFLIGHT_CORS_EXPOSE_HEADERS` - comma-separated list
//! - `PREFLIGHT_CORS_MAX_AGE` - seconds
//! - `PREFLIGHT_CORS_CREDENTIALS` - `true` / `false`

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::middleware::{CorsConfigError, CorsPolicy, CorsPolicyBuilder};

/// Wrapper key accepted at the top of a configuration file
const SECTION: &str = "cors";

/// Serializable CORS policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins accepted by the default validator; `"*"` accepts any origin
    pub allow_origins: Vec<String>,
    /// Regular expressions an origin may match instead of being listed
    pub allow_origin_patterns: Vec<String>,
    /// Methods advertised on preflight responses, in order
    pub allow_methods: Vec<String>,
    /// Headers advertised on preflight responses; empty echoes the request
    pub allow_headers: Vec<String>,
    /// Headers exposed on actual responses
    pub expose_headers: Vec<String>,
    /// Preflight cache lifetime in seconds; `0` omits the header
    pub max_age: u64,
    /// Send `Access-Control-Allow-Credentials: true`
    pub credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".into()],
            allow_origin_patterns: vec![],
            allow_methods: ["GET", "HEAD", "PUT", "POST", "DELETE", "PATCH"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allow_headers: vec![],
            expose_headers: vec![],
            max_age: 0,
            credentials: false,
        }
    }
}

impl CorsConfig {
    /// Overlay `PREFLIGHT_CORS_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup.
    ///
    /// Same keys as [`apply_env_overrides`](Self::apply_env_overrides).
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PREFLIGHT_CORS_ALLOW_ORIGINS") {
            self.allow_origins = split_list(&v);
        }
        if let Some(v) = lookup("PREFLIGHT_CORS_ALLOW_METHODS") {
            self.allow_methods = split_list(&v);
        }
        if let Some(v) = lookup("PREFLIGHT_CORS_ALLOW_HEADERS") {
            self.allow_headers = split_list(&v);
        }
        if let Some(v) = lookup("PREFLIGHT_CORS_EXPOSE_HEADERS") {
            self.expose_headers = split_list(&v);
        }
        if let Some(v) = lookup("PREFLIGHT_CORS_MAX_AGE") {
            match v.trim().parse() {
                Ok(secs) => self.max_age = secs,
                Err(_) => warn!(value = %v, "Ignoring invalid PREFLIGHT_CORS_MAX_AGE"),
            }
        }
        if let Some(v) = lookup("PREFLIGHT_CORS_CREDENTIALS") {
            match v.trim().to_lowercase().parse() {
                Ok(flag) => self.credentials = flag,
                Err(_) => warn!(value = %v, "Ignoring invalid PREFLIGHT_CORS_CREDENTIALS"),
            }
        }
    }

    /// Build a [`CorsPolicy`] from this configuration
    ///
    /// # Errors
    ///
    /// See [`CorsPolicyBuilder::build`].
    pub fn build_policy(&self) -> Result<CorsPolicy, CorsConfigError> {
        CorsPolicyBuilder::from_config(self).build()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Load a [`CorsConfig`] from a YAML (`.yaml`/`.yml`) or JSON file
///
/// An empty file yields the defaults.
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CorsConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CORS config {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        parse_yaml(&content).with_context(|| format!("Invalid YAML in {}", path.display()))
    } else {
        parse_json(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}

/// Parse a YAML document, unwrapping an optional top-level `cors:` key
///
/// # Errors
///
/// Fails on malformed YAML or mistyped fields.
pub fn parse_yaml(content: &str) -> Result<CorsConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    let section = match value.get(SECTION) {
        Some(inner) => inner.clone(),
        None => value,
    };
    if section.is_null() {
        return Ok(CorsConfig::default());
    }
    Ok(serde_yaml::from_value(section)?)
}

/// Parse a JSON document, unwrapping an optional top-level `"cors"` key
///
/// # Errors
///
/// Fails on malformed JSON or mistyped fields.
pub fn parse_json(content: &str) -> Result<CorsConfig> {
    if content.trim().is_empty() {
        return Ok(CorsConfig::default());
    }
    let value: serde_json::Value = serde_json::from_str(content)?;
    let section = match value.get(SECTION) {
        Some(inner) => inner.clone(),
        None => value,
    };
    if section.is_null() {
        return Ok(CorsConfig::default());
    }
    Ok(serde_json::from_value(section)?)
}

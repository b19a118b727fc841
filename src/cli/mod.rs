//! # CLI Module
//!
//! Command-line front end for inspecting a CORS configuration without
//! running a server.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Evaluate one synthetic request and print the resulting status and headers
//! as JSON:
//!
//! ```bash
//! preflight check --config cors.yaml \
//!     --method OPTIONS \
//!     --origin https://app.example.com \
//!     --request-method PUT \
//!     --request-headers "Content-Type, X-Request-Id"
//! ```
//!
//! ### `config`
//!
//! Print the resolved configuration (file, then `PREFLIGHT_CORS_*`
//! overrides, then defaults) as YAML:
//!
//! ```bash
//! preflight config --config cors.yaml
//! ```

mod commands;


pub use commands::{evaluate_request, resolve_config, run_cli, CheckReport, Cli, Commands};

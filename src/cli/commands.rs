use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{load_config, CorsConfig};
use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::middleware::{CorsMiddleware, CorsPolicy, TracingMiddleware};

/// Command-line interface for preflight
#[derive(Parser)]
#[command(name = "preflight")]
#[command(about = "Evaluate CORS policies offline", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a request against a CORS policy and print the response
    Check {
        /// Policy file (YAML or JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Value of the Origin header
        #[arg(short, long)]
        origin: Option<String>,

        /// Value of Access-Control-Request-Method
        #[arg(long)]
        request_method: Option<String>,

        /// Value of Access-Control-Request-Headers
        #[arg(long)]
        request_headers: Option<String>,

        /// Extra request headers as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Print the resolved configuration as YAML
    Config {
        /// Policy file (YAML or JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Result of evaluating one request, as printed by `preflight check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Final status code
    pub status: u16,
    /// Whether the handler ran
    pub handler_ran: bool,
    /// Response headers, lowercased names
    pub headers: Map<String, Value>,
    /// Response body (`null` when empty)
    pub body: Value,
}

/// Load `path` (or the defaults) and overlay `PREFLIGHT_CORS_*` variables.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed.
pub fn resolve_config(path: Option<&Path>) -> Result<CorsConfig> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => CorsConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Run `req` through a dispatcher guarded by `policy`.
///
/// The stand-in handler answers `200 "ok"`, so `handler_ran` tells whether
/// the policy let the request through.
#[must_use]
pub fn evaluate_request(policy: Arc<CorsPolicy>, req: &HandlerRequest) -> CheckReport {
    let mut dispatcher = Dispatcher::new(|_req, res| {
        res.status = 200;
        res.body = Value::String("ok".to_string());
    });
    dispatcher.add_middleware(Arc::new(CorsMiddleware::from_shared(policy)));
    dispatcher.add_middleware(Arc::new(TracingMiddleware));

    let res = dispatcher.dispatch(req);
    let headers = res
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), Value::String(v.clone())))
        .collect();
    CheckReport {
        status: res.status,
        handler_ran: res.body == Value::String("ok".to_string()),
        headers,
        body: res.body,
    }
}

fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header '{}' must look like 'Name: value'", raw))?;
    Ok((name.trim(), value.trim()))
}

/// Execute a parsed command line
///
/// # Errors
///
/// Propagates configuration, policy and argument errors.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            config,
            method,
            origin,
            request_method,
            request_headers,
            headers,
        } => {
            let config = resolve_config(config.as_deref())?;
            let policy = config.build_policy().context("Invalid CORS configuration")?;
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("Invalid method '{}'", method))?;

            let mut req = HandlerRequest::new(method, "/");
            if let Some(origin) = &origin {
                req = req.with_header("Origin", origin);
            }
            if let Some(m) = &request_method {
                req = req.with_header("Access-Control-Request-Method", m);
            }
            if let Some(h) = &request_headers {
                req = req.with_header("Access-Control-Request-Headers", h);
            }
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                req = req.with_header(name, value);
            }

            let report = evaluate_request(Arc::new(policy), &req);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config { config } => {
            let config = resolve_config(config.as_deref())?;
            // Surface token errors here too, not only at `check` time.
            config.build_policy().context("Invalid CORS configuration")?;
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }
    Ok(())
}

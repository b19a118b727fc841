use clap::Parser;
use preflight::cli::{run_cli, Cli};
use preflight::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if std::env::var("PREFLIGHT_LOG_LEVEL").is_err() {
        // Keep CLI output quiet unless asked otherwise.
        log_config.log_level = "warn".to_string();
    }
    let _guard = init_logging_with_config(&log_config)?;

    run_cli(cli)
}

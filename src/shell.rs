//! Process setup shared by binaries: logging and config bootstrap.

use anyhow::{Context, Result};
use log::info;

use crate::cli::Args;
use crate::config::{TimelineConfig, CONFIG_FILE};
use crate::paths::{self, PathConfig, LOG_FILE};

/// Initialize env_logger from CLI flags.
///
/// `--log [FILE]` writes to a file at the `-v` level; otherwise logs go to
/// stderr and `RUST_LOG` overrides the `-v` default.
pub fn init_logger(args: &Args, path_config: &PathConfig) -> Result<()> {
    let log_level = args.log_level();

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| paths::data_file(LOG_FILE, path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        let default_level = log_level.to_string().to_lowercase();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Load `vseq.json` from the resolved config dir (defaults when absent).
pub fn load_config(path_config: &PathConfig) -> Result<TimelineConfig> {
    let path = paths::config_file(CONFIG_FILE, path_config);
    info!("Config path: {}", path.display());
    TimelineConfig::load(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

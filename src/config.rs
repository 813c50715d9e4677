use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};
use toml;

/// Configuration for the Recall server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Queue length used when a request doesn't ask for one
    pub default_queue_limit: usize,
    /// Upper bound on any requested queue length
    pub max_queue_limit: usize,
    /// Minutes a review session may sit idle before it is dropped (0 for never)
    pub session_ttl_minutes: u64,
    /// Emit logs as JSON instead of human-readable text
    pub log_json: bool,
    /// Directory for the daily log file; no file logging if unset
    pub log_dir: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub default_queue_limit: Option<usize>,
    #[serde(default)]
    pub max_queue_limit: Option<usize>,
    #[serde(default)]
    pub session_ttl_minutes: Option<u64>,
    #[serde(default)]
    pub log_json: Option<bool>,
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Server URL for the CLI client; the server itself ignores it
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug)]
#[clap(name = "recall", about = "A spaced-repetition review scheduler")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on
    #[clap(long, env = "RECALL_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Default number of items in a queue
    #[clap(long, env = "RECALL_DEFAULT_QUEUE_LIMIT")]
    pub default_queue_limit: Option<usize>,

    /// Maximum number of items in a queue
    #[clap(long, env = "RECALL_MAX_QUEUE_LIMIT")]
    pub max_queue_limit: Option<usize>,

    /// Idle minutes before a review session expires
    #[clap(long, env = "RECALL_SESSION_TTL_MINUTES")]
    pub session_ttl_minutes: Option<u64>,

    /// Directory for the daily log file
    #[clap(long, env = "RECALL_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Log as JSON
    #[clap(long, env = "RECALL_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Debug mode
    #[clap(long, env = "RECALL_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            default_queue_limit: update.default_queue_limit.unwrap_or(self.default_queue_limit),
            max_queue_limit: update.max_queue_limit.unwrap_or(self.max_queue_limit),
            session_ttl_minutes: update.session_ttl_minutes.unwrap_or(self.session_ttl_minutes),
            log_json: update.log_json.unwrap_or(self.log_json),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the session idle timeout as a Duration
    ///
    /// A TTL of 0 means sessions never expire.
    pub fn session_ttl(&self) -> chrono::Duration {
        if self.session_ttl_minutes == 0 {
            return chrono::Duration::MAX;
        }
        i64::try_from(self.session_ttl_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }
}

/// Returns the base (default) configuration
///
/// With a config directory, the database and log files live inside it;
/// otherwise they go in the working directory and file logging is off.
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.as_ref().map_or("recall.db".to_string(), |path| path.join("recall.db").to_string_lossy().to_string());
    let log_dir = config_path.map(|path| path.join("logs").to_string_lossy().to_string());

    Config {
        database_url,
        bind_address: "0.0.0.0:3000".to_string(),
        default_queue_limit: 20,
        max_queue_limit: 100,
        session_ttl_minutes: 60,
        log_json: false,
        log_dir,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        default_queue_limit: args.default_queue_limit,
        max_queue_limit: args.max_queue_limit,
        session_ttl_minutes: args.session_ttl_minutes,
        log_json: args.log_json.then_some(true),
        log_dir: args.log_dir,
        server_url: None,
    }
}

/// Returns the platform config directory, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "recall", "recall") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_path.clone());

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_path.map(|path| path.join("config.toml"))).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!("Final configuration: database_url={}, bind_address={}, queue_limit={}/{}, session_ttl={}min",
          config.database_url, config.bind_address, config.default_queue_limit, config.max_queue_limit, config.session_ttl_minutes);

    config
}

#[cfg(test)]
mod tests;

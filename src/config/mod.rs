//! Global configuration for quipsolve.
//!
//! The CLI turns its arguments into a `Config` struct which is stored in a
//! global `OnceCell` and read by the rest of the program.
//! ```rust
//! use quipsolve::config::get_config;
//! let config = get_config();
//! assert!(!config.api_mode);
//! ```

use once_cell::sync::OnceCell;

/// Base URL of the remote solving oracle.
pub const DEFAULT_ORACLE_URL: &str = "https://cryptoquip-solver.litebloggingpro.workers.dev";
/// Daily cryptoquip feed endpoint.
pub const DEFAULT_CRYPTOQUIP_FEED_URL: &str = "https://cryptoquip-worker.akagautam7.workers.dev/";
/// Daily cryptoquote feed endpoint.
pub const DEFAULT_CRYPTOQUOTE_FEED_URL: &str = "https://cryptoquote-worker.akagautam7.workers.dev/";

/// The global configuration object for the entire program.
#[derive(Debug, Clone)]
pub struct Config {
    /// A level of verbosity to determine
    /// how much we print in logs.
    pub verbose: u8,
    /// Base URL of the solving oracle (`/solve` and `/status` live here).
    pub oracle_url: String,
    /// Endpoint for the daily cryptoquip solution feed.
    pub cryptoquip_feed_url: String,
    /// Endpoint for the daily cryptoquote solution feed.
    pub cryptoquote_feed_url: String,
    /// HTTP request timeout in seconds.
    pub http_timeout: u64,
    /// Delay between two polling attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// How many status requests are made before the session fails closed.
    pub max_poll_attempts: u32,
    /// Run in API mode, this will return results instead of printing them.
    pub api_mode: bool,
}

/// Cell for storing global Config
static CONFIG: OnceCell<Config> = OnceCell::new();

/// To initialize global config with custom values
pub fn set_global_config(config: Config) {
    CONFIG.set(config).ok(); // ok() used to make compiler happy about using Result
}

/// Get the global config.
/// This will return default config if the config isn't initialized
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbose: 0,
            oracle_url: DEFAULT_ORACLE_URL.to_string(),
            cryptoquip_feed_url: DEFAULT_CRYPTOQUIP_FEED_URL.to_string(),
            cryptoquote_feed_url: DEFAULT_CRYPTOQUOTE_FEED_URL.to_string(),
            http_timeout: 30,
            poll_interval_ms: 1000,
            max_poll_attempts: 20,
            api_mode: false,
        }
    }
}

//! Logging utilities
//!
//! Sets up `env_logger` behind the `log` facade. The level chosen on the
//! command line is the default; `RUST_LOG` overrides it.
//!
//! # Example
//!
//! ```rust
//! use log::LevelFilter;
//! use zksql_node::utils::Logger;
//!
//! Logger::init_with_level(LevelFilter::Debug);
//! log::debug!("logger initialized");
//! ```

use log::LevelFilter;

/// Logging utilities
pub struct Logger;

impl Logger {
    /// Initialize the logger at `info`
    pub fn init() {
        Self::init_with_level(LevelFilter::Info);
    }

    /// Initialize logger with custom log level
    ///
    /// Calling it again after a logger is installed has no effect.
    ///
    /// # Arguments
    /// * `level` - Default log level filter
    pub fn init_with_level(level: LevelFilter) {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init();
    }

    /// Parse a level name such as `info` or `DEBUG`
    pub fn parse_level(name: &str) -> Option<LevelFilter> {
        name.parse().ok()
    }
}

//! Helper functions
//!
//! Small formatting and parsing helpers shared by the CLI.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use zksql_node::utils::Helpers;
//!
//! assert_eq!(Helpers::format_duration(Duration::from_millis(1_234)), "1.23s");
//! assert_eq!(Helpers::split_list("id, owner,balance"), vec!["id", "owner", "balance"]);
//! ```

use std::time::Duration;

/// Helper functions
pub struct Helpers;

impl Helpers {
    /// Format a duration to a human-readable string
    ///
    /// # Returns
    /// Formatted string (e.g., "1.23s", "500ms", "800ns")
    pub fn format_duration(duration: Duration) -> String {
        if duration.as_secs() >= 1 {
            format!("{:.2}s", duration.as_secs_f64())
        } else if duration.as_millis() >= 1 {
            format!("{}ms", duration.as_millis())
        } else if duration.as_micros() >= 1 {
            format!("{}µs", duration.as_micros())
        } else {
            format!("{}ns", duration.as_nanos())
        }
    }

    /// Split a comma-separated list, trimming entries and dropping empty ones
    ///
    /// Column names never contain commas on the command line, so this is
    /// the whole grammar.
    pub fn split_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

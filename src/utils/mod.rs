//! Utilities module
//!
//! This module provides utility functions for common operations:
//! - Logging setup
//! - Formatting and parsing helpers for the CLI
//!
//! # Example
//!
//! ```rust
//! use zksql_node::utils::{Helpers, Logger};
//!
//! Logger::init();
//! let columns = Helpers::split_list("id,name");
//! assert_eq!(columns.len(), 2);
//! ```

pub mod helpers;
pub mod logger;

// Re-export main types for convenience
pub use helpers::Helpers;
pub use logger::Logger;

//! API layer module
//!
//! This module provides the node's HTTP/JSON API and a matching client.
//! It is only available when the `api` feature is enabled.
//!
//! # Example
//!
//! ```rust,no_run
//! use zksql_node::api::ApiClient;
//!
//! # async fn run() -> Result<(), zksql_node::api::ClientError> {
//! let client = ApiClient::new("http://127.0.0.1:8080");
//! let health = client.health_check().await?;
//! println!("node {} is {}", health.version, health.status);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "api")]
pub mod client;
#[cfg(feature = "api")]
pub mod server;

// Re-export main types when API feature is enabled
#[cfg(feature = "api")]
pub use client::{ApiClient, ClientError};
#[cfg(feature = "api")]
pub use server::{router, ApiError, ApiServer, AppState};

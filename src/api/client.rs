//! API client
//!
//! This module provides HTTP client functionality for interacting with the API server.
//!
//! # Example
//!
//! ```rust,no_run
//! use zksql_node::api::ApiClient;
//! use zksql_node::types::{Column, DataType, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://127.0.0.1:8080");
//!
//!     // after the commitment was posted on-chain
//!     let table = Table::new("users", vec![Column::new("id", DataType::Integer)]);
//!     let ack = client.create_table(&table).await?;
//!     println!("created with commitment {}", ack.commitment);
//!
//!     Ok(())
//! }
//! ```

use crate::api::server::{
    CreateTableRequest, ErrorResponse, HealthResponse, VerifyProofRequest, VerifyProofResponse,
};
use crate::config::CircuitParams;
use crate::coordinator::{Acknowledgement, RegisteredTable};
use crate::proof::ProofArtifact;
use crate::types::Table;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },
}

impl ClientError {
    /// Server error kind, if the server answered with an error body
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Api { kind, .. } => Some(kind),
            ClientError::Http(_) => None,
        }
    }
}

/// API client
///
/// Provides methods for interacting with the node's API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API server
    base_url: String,

    /// Connection pool
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API server (e.g., "http://127.0.0.1:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let (kind, message) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.kind, body.error),
            Err(_) => ("http".to_string(), text),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            kind,
            message,
        })
    }

    /// Ask the node to create a table whose commitment was posted on-chain
    ///
    /// Blocks until the node confirms or gives up.
    pub async fn create_table(&self, table: &Table) -> Result<Acknowledgement, ClientError> {
        let request = CreateTableRequest {
            table: table.clone(),
        };
        let response = self
            .http
            .post(self.url("/create"))
            .json(&request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Verify a proof
    ///
    /// # Arguments
    /// * `operation_kind` - `select`, `insert`, `update` or `delete`
    /// * `public_inputs` - Decimal public inputs
    /// * `proof` - Proof artifact
    pub async fn verify_proof(
        &self,
        operation_kind: &str,
        public_inputs: &[String],
        proof: &ProofArtifact,
    ) -> Result<bool, ClientError> {
        let request = VerifyProofRequest {
            operation_kind: operation_kind.to_string(),
            public_inputs: public_inputs
                .iter()
                .cloned()
                .map(serde_json::Value::String)
                .collect(),
            proof: proof.clone(),
        };
        let response = self
            .http
            .post(self.url("/verify"))
            .json(&request)
            .send()
            .await?;
        let result: VerifyProofResponse = Self::decode(response).await?;
        Ok(result.valid)
    }

    /// Registration of a table, `None` if the node does not know it
    pub async fn table(&self, name: &str) -> Result<Option<RegisteredTable>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/tables/{}", name)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    /// Circuit bounds published by the node
    pub async fn params(&self) -> Result<CircuitParams, ClientError> {
        let response = self.http.get(self.url("/params")).send().await?;
        Self::decode(response).await
    }

    /// Health check
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::{ApiServer, AppState};
    use crate::chain::PendingCommitmentSet;
    use crate::commitment::Commitment;
    use crate::coordinator::{BackoffPolicy, TableCoordinator};
    use crate::database::JsonFileStorage;
    use crate::proof::{SnarkjsBackend, VerificationKeys, Verifier};
    use crate::types::{Column, DataType};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://127.0.0.1:8080/");
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
        assert_eq!(client.url("/health"), "http://127.0.0.1:8080/health");
    }

    #[tokio::test]
    async fn test_client_against_server() {
        let dir = tempfile::tempdir().unwrap();
        let pending = Arc::new(PendingCommitmentSet::new());
        let storage = Arc::new(JsonFileStorage::open(dir.path().join("db.json"), "testdb").unwrap());
        let policy = BackoffPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
            max_attempts: 3,
            deadline: Duration::from_millis(200),
        };
        let coordinator = Arc::new(TableCoordinator::new(
            pending.clone(),
            storage,
            policy,
            CircuitParams::default(),
        ));
        let keys = VerificationKeys::new(json!({}), json!({}), json!({}), json!({}));
        let state = Arc::new(AppState {
            coordinator,
            verifier: Verifier::new(keys, Arc::new(SnarkjsBackend::new("/nonexistent/snarkjs"))),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = ApiServer::new(addr, state);
        tokio::spawn(async move { server.serve(listener).await });

        let client = ApiClient::new(format!("http://{}", addr));
        let health = client.health_check().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.backend, "snarkjs");
        assert_eq!(client.params().await.unwrap(), CircuitParams::default());

        let table = Table::new("users", vec![Column::new("id", DataType::Integer)]);
        let err = client.create_table(&table).await.unwrap_err();
        assert_eq!(err.kind(), Some("confirmation_timeout"));

        pending.observe(Commitment::for_table(&table));
        let ack = client.create_table(&table).await.unwrap();
        assert_eq!(ack.commitment, Commitment::for_table(&table));
        assert_eq!(
            client.table("users").await.unwrap().unwrap().columns,
            vec!["id"]
        );
        assert!(client.table("orders").await.unwrap().is_none());

        let err = client
            .verify_proof("upsert", &[], &ProofArtifact(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some("unsupported_operation"));
    }
}

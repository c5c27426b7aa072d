//! API server
//!
//! HTTP/JSON front end for table creation and proof verification, built on
//! Axum.
//!
//! | Route                | Purpose                                    |
//! |----------------------|--------------------------------------------|
//! | `POST /create`       | Create a table once its commitment is seen |
//! | `POST /verify`       | Verify an operation proof                  |
//! | `GET /tables/{name}` | Columns and commitment of a table          |
//! | `GET /params`        | Circuit bounds                             |
//! | `GET /health`        | Liveness, version and loaded keys          |
//!
//! Failures are `{ "ok": false, "kind": ..., "error": ... }` with a status
//! derived from the error kind. Bodies that do not parse are reported the same
//! way with kind `invalid_request`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zksql_node::api::{ApiServer, AppState};
//! # fn state() -> AppState { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let server = ApiServer::new("127.0.0.1:8080".parse().unwrap(), Arc::new(state()));
//!     server.start().await
//! }
//! ```

use crate::config::CircuitParams;
use crate::coordinator::{Acknowledgement, RegisteredTable, TableCoordinator};
use crate::error::Error;
use crate::proof::{KeySummary, ProofArtifact, Verifier};
use crate::types::{OperationKind, Table};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared request-handler state
pub struct AppState {
    /// Table-creation coordinator
    pub coordinator: Arc<TableCoordinator>,

    /// Proof verifier
    pub verifier: Verifier,
}

/// API server
pub struct ApiServer {
    /// Server address
    addr: SocketAddr,

    /// Handler state
    state: Arc<AppState>,
}

/// Table creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableRequest {
    /// Table definition whose column names were committed on-chain
    pub table: Table,
}

/// Proof verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofRequest {
    /// `select`, `insert`, `update` or `delete`
    pub operation_kind: String,

    /// Public inputs, as decimal strings or JSON integers
    pub public_inputs: Vec<Value>,

    /// Proof artifact
    pub proof: ProofArtifact,
}

/// Proof verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyProofResponse {
    /// Whether the proof is valid
    pub valid: bool,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub tables: usize,
    pub keys: BTreeMap<OperationKind, KeySummary>,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,

    /// Stable error kind
    pub kind: String,

    /// Human-readable message
    pub error: String,
}

/// Handler error
#[derive(Debug)]
pub enum ApiError {
    /// Error from the node
    Node(Error),

    /// Unknown table
    NotFound(String),

    /// Body missing or not a valid request
    InvalidRequest(JsonRejection),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(rejection) => rejection.status(),
            ApiError::Node(err) => match err {
                Error::ConfirmationTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
                Error::TableConflict(_) | Error::TableAlreadyExists(_) => StatusCode::CONFLICT,
                Error::InvalidTable { .. }
                | Error::InvalidPublicInput { .. }
                | Error::UnsupportedOperation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::VerificationBackend(_) => StatusCode::BAD_GATEWAY,
                Error::StorageWriteFailure(_) | Error::KeyStore(_) | Error::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Node(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Node(err) => ErrorResponse {
                ok: false,
                kind: err.kind().to_string(),
                error: err.to_string(),
            },
            ApiError::NotFound(name) => ErrorResponse {
                ok: false,
                kind: "not_found".to_string(),
                error: format!("table {} not found", name),
            },
            ApiError::InvalidRequest(rejection) => ErrorResponse {
                ok: false,
                kind: "invalid_request".to_string(),
                error: rejection.body_text(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router over shared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/params", get(circuit_params))
        .route("/create", post(create_table))
        .route("/verify", post(verify_proof))
        .route("/tables/{name}", get(get_table))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

impl ApiServer {
    /// Create a new API server
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to
    /// * `state` - Handler state
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    /// Bind and serve until the process stops
    pub async fn start(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        log::info!("API server listening on {}", listener.local_addr()?);
        axum::serve(listener, router(Arc::clone(&self.state))).await
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let keys = state.verifier.keys().summary();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        backend: state.verifier.backend_name().to_string(),
        tables: state.coordinator.registry().len(),
        keys,
    })
}

async fn circuit_params(State(state): State<Arc<AppState>>) -> Json<CircuitParams> {
    Json(*state.coordinator.circuit_params())
}

async fn create_table(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTableRequest>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let Json(request) = payload?;
    let name = request.table.name.clone();
    match state.coordinator.request_table_creation(request.table).await {
        Ok(ack) => Ok(Json(ack)),
        Err(err) => {
            log::info!("create {} rejected: {}", name, err);
            Err(err.into())
        }
    }
}

async fn verify_proof(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyProofRequest>, JsonRejection>,
) -> Result<Json<VerifyProofResponse>, ApiError> {
    let Json(request) = payload?;
    let public_inputs = input_literals(&request.public_inputs)?;
    let valid = state
        .verifier
        .verify_tagged(&request.operation_kind, &public_inputs, &request.proof)
        .await?;
    Ok(Json(VerifyProofResponse { valid }))
}

/// Textual form of each submitted public input
///
/// Numbers keep their JSON spelling, so `12` becomes `"12"` while `-1` or
/// `1.5` are later rejected by canonicalization.
fn input_literals(values: &[Value]) -> Result<Vec<String>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(Error::InvalidPublicInput {
                index,
                value: other.to_string(),
                reason: "expected a decimal string or an integer".to_string(),
            }),
        })
        .collect()
}

async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<RegisteredTable>, ApiError> {
    state
        .coordinator
        .lookup(&name)
        .map(Json)
        .ok_or(ApiError::NotFound(name))
}

//! Table-creation coordinator
//!
//! Runs the node side of the commit-reveal protocol:
//!
//! 1. Recompute the commitment to the requested column names
//! 2. Claim the table name so concurrent duplicates are turned away
//! 3. Poll the chain listener's pending set with bounded backoff
//! 4. Once the commitment is observed, write the table to storage and then
//!    register `name -> (columns, commitment)`
//!
//! A table is never materialized unless its commitment was seen on-chain, and
//! the registry never holds a table whose storage write failed.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zksql_node::chain::PendingCommitmentSet;
//! use zksql_node::commitment::Commitment;
//! use zksql_node::config::CircuitParams;
//! use zksql_node::coordinator::{BackoffPolicy, TableCoordinator};
//! use zksql_node::database::JsonFileStorage;
//! use zksql_node::types::{Column, DataType, Table};
//!
//! # async fn run() -> zksql_node::Result<()> {
//! let pending = Arc::new(PendingCommitmentSet::new());
//! let storage = Arc::new(JsonFileStorage::open("data/db.json", "zksql").unwrap());
//! let coordinator = TableCoordinator::new(
//!     pending.clone(),
//!     storage,
//!     BackoffPolicy::default(),
//!     CircuitParams::default(),
//! );
//!
//! let table = Table::new("users", vec![Column::new("id", DataType::Integer)]);
//! pending.observe(Commitment::for_table(&table));
//!
//! let ack = coordinator.request_table_creation(table).await?;
//! assert!(ack.ok);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
mod claims;
pub mod registry;

pub use backoff::{BackoffPolicy, PollExhausted};
pub use registry::{RegisteredTable, TableRegistry};

use crate::chain::PendingCommitments;
use crate::commitment::Commitment;
use crate::config::CircuitParams;
use crate::database::{StorageError, TableStore};
use crate::error::{Error, Result};
use crate::types::Table;
use claims::ClaimSet;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Successful table creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Always `true`; failures are reported as errors
    pub ok: bool,

    /// Created table name
    pub table: String,

    /// Confirmed commitment
    pub commitment: Commitment,
}

/// Table-creation coordinator
pub struct TableCoordinator {
    /// Chain listener view
    pending: Arc<dyn PendingCommitments>,

    /// Durable table sink
    storage: Arc<dyn TableStore>,

    /// Created tables
    registry: Arc<TableRegistry>,

    /// Names with a creation in flight
    claims: ClaimSet,

    /// Serializes storage flushes with their registry insert
    write_gate: Arc<Mutex<()>>,

    /// Confirmation polling budget
    policy: BackoffPolicy,

    /// Circuit bounds
    circuit: CircuitParams,
}

impl TableCoordinator {
    /// Create a coordinator
    ///
    /// The registry is rebuilt from the tables already in `storage`.
    pub fn new(
        pending: Arc<dyn PendingCommitments>,
        storage: Arc<dyn TableStore>,
        policy: BackoffPolicy,
        circuit: CircuitParams,
    ) -> Self {
        let registry = TableRegistry::from_tables(&storage.tables());
        if !registry.is_empty() {
            log::info!("restored {} tables from storage", registry.len());
        }

        Self {
            pending,
            storage,
            registry: Arc::new(registry),
            claims: ClaimSet::default(),
            write_gate: Arc::new(Mutex::new(())),
            policy,
            circuit,
        }
    }

    /// Create a table once its commitment is observed on-chain
    ///
    /// # Errors
    /// - `InvalidTable` if the definition breaks structural rules
    /// - `TableConflict` if the name is already being created
    /// - `TableAlreadyExists` if the name is registered
    /// - `ConfirmationTimeout` if the commitment never showed up
    /// - `StorageWriteFailure` if the table could not be persisted
    pub async fn request_table_creation(&self, table: Table) -> Result<Acknowledgement> {
        table.validate(self.circuit.max_cols)?;
        let commitment = Commitment::for_table(&table);

        let _claim = self
            .claims
            .claim(&table.name)
            .ok_or_else(|| Error::TableConflict(table.name.clone()))?;
        if self.registry.contains(&table.name) {
            return Err(Error::TableAlreadyExists(table.name));
        }

        log::info!(
            "awaiting on-chain commitment {} for table {}",
            commitment,
            table.name
        );

        let pending = &self.pending;
        match self.policy.poll_until(|| pending.contains(&commitment)).await {
            Ok(attempts) => log::info!(
                "commitment for table {} confirmed after {} attempts",
                table.name,
                attempts
            ),
            Err(PollExhausted { attempts, elapsed }) => {
                log::warn!(
                    "commitment {} for table {} not observed after {} attempts ({:?})",
                    commitment,
                    table.name,
                    attempts,
                    elapsed
                );
                return Err(Error::ConfirmationTimeout {
                    table: table.name,
                    commitment,
                    attempts,
                    elapsed,
                });
            }
        }

        self.materialize(&table, commitment).await?;
        log::info!("created table {} ({} columns)", table.name, table.num_columns());

        Ok(Acknowledgement {
            ok: true,
            table: table.name,
            commitment,
        })
    }

    /// Persist and register a confirmed table
    ///
    /// Storage I/O is blocking, so the write and the registry insert run
    /// together on the blocking pool. Once started they run to completion
    /// even if the request is cancelled.
    async fn materialize(&self, table: &Table, commitment: Commitment) -> Result<()> {
        let storage = Arc::clone(&self.storage);
        let registry = Arc::clone(&self.registry);
        let gate = Arc::clone(&self.write_gate);
        let table = table.clone();

        tokio::task::spawn_blocking(move || {
            let _gate = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            persist(storage.as_ref(), &registry, &table, commitment)
        })
        .await
        .map_err(|e| Error::StorageWriteFailure(format!("storage task failed: {}", e)))?
    }

    /// Registration for a created table
    pub fn lookup(&self, name: &str) -> Option<RegisteredTable> {
        self.registry.get(name)
    }

    /// Names of all created tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Created-table registry
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Circuit bounds tables are checked against
    pub fn circuit_params(&self) -> &CircuitParams {
        &self.circuit
    }

    /// Confirmation polling budget
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

fn persist(
    storage: &dyn TableStore,
    registry: &TableRegistry,
    table: &Table,
    commitment: Commitment,
) -> Result<()> {
    storage.create_table(table).map_err(|e| match e {
        StorageError::Duplicate(name) => Error::TableAlreadyExists(name),
        other => Error::StorageWriteFailure(other.to_string()),
    })?;

    if let Err(e) = storage.write_db() {
        log::warn!("storage write for table {} failed: {}", table.name, e);
        if let Err(rollback) = storage.drop_table(&table.name) {
            log::error!("rollback of table {} failed: {}", table.name, rollback);
        }
        return Err(Error::StorageWriteFailure(e.to_string()));
    }

    registry
        .insert(RegisteredTable {
            name: table.name.clone(),
            columns: table.column_names(),
            commitment,
        })
        .map_err(|existing| Error::TableAlreadyExists(existing.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PendingCommitmentSet;
    use crate::commitment::commit_to_table;
    use crate::database::JsonFileStorage;
    use crate::types::{Column, DataType};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    /// In-memory store whose flushes can be made to fail or to block
    #[derive(Default)]
    struct MemoryStore {
        tables: Mutex<Vec<Table>>,
        fail_writes: AtomicBool,
        flushing: AtomicBool,
        hold: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl TableStore for MemoryStore {
        fn create_table(&self, table: &Table) -> std::result::Result<(), StorageError> {
            let mut tables = self.tables.lock().unwrap();
            if tables.iter().any(|t| t.name == table.name) {
                return Err(StorageError::Duplicate(table.name.clone()));
            }
            tables.push(table.clone());
            Ok(())
        }

        fn write_db(&self) -> std::result::Result<(), StorageError> {
            self.flushing.store(true, Ordering::SeqCst);
            if let Some(hold) = self.hold.lock().unwrap().as_ref() {
                if hold.recv_timeout(Duration::from_secs(5)).is_err() {
                    return Err(StorageError::Io {
                        path: "memory".into(),
                        source: std::io::Error::new(std::io::ErrorKind::TimedOut, "flush held"),
                    });
                }
            }
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    path: "memory".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            Ok(())
        }

        fn drop_table(&self, name: &str) -> std::result::Result<(), StorageError> {
            self.tables.lock().unwrap().retain(|t| t.name != name);
            Ok(())
        }

        fn tables(&self) -> Vec<Table> {
            self.tables.lock().unwrap().clone()
        }
    }

    fn policy() -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
            multiplier: 2.0,
            max_attempts: 10,
            deadline: Duration::from_secs(5),
        }
    }

    fn setup() -> (Arc<PendingCommitmentSet>, Arc<MemoryStore>, TableCoordinator) {
        let pending = Arc::new(PendingCommitmentSet::new());
        let storage = Arc::new(MemoryStore::default());
        let coordinator = TableCoordinator::new(
            pending.clone(),
            storage.clone(),
            policy(),
            CircuitParams::default(),
        );
        (pending, storage, coordinator)
    }

    fn accounts() -> Table {
        Table::new(
            "accounts",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("owner", DataType::Varchar(64)),
                Column::new("balance", DataType::Decimal),
            ],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_confirmed_table() {
        let (pending, storage, coordinator) = setup();
        pending.observe(commit_to_table(&["id", "owner", "balance"]));

        let ack = coordinator.request_table_creation(accounts()).await.unwrap();
        assert!(ack.ok);
        assert_eq!(ack.table, "accounts");
        assert_eq!(ack.commitment, commit_to_table(&["id", "owner", "balance"]));

        let entry = coordinator.lookup("accounts").unwrap();
        assert_eq!(entry.columns, vec!["id", "owner", "balance"]);
        assert_eq!(entry.commitment, ack.commitment);
        assert_eq!(storage.tables(), vec![accounts()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_writes_nothing() {
        let (_pending, storage, coordinator) = setup();

        let err = coordinator
            .request_table_creation(accounts())
            .await
            .unwrap_err();
        match err {
            Error::ConfirmationTimeout {
                table, attempts, ..
            } => {
                assert_eq!(table, "accounts");
                assert!(attempts >= 1 && attempts <= 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(coordinator.lookup("accounts").is_none());
        assert!(storage.tables().is_empty());
        assert!(!coordinator.claims.is_claimed("accounts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_confirmation() {
        let (pending, _storage, coordinator) = setup();
        let commitment = Commitment::for_table(&accounts());

        let observer = async {
            tokio::time::sleep(Duration::from_millis(1_200)).await;
            pending.observe(commitment);
        };
        let (result, ()) = tokio::join!(coordinator.request_table_creation(accounts()), observer);

        assert_eq!(result.unwrap().commitment, commitment);
        assert!(coordinator.registry().contains("accounts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_commitment_not_accepted() {
        let (pending, _storage, coordinator) = setup();
        // same columns, different order
        pending.observe(commit_to_table(&["owner", "id", "balance"]));

        let err = coordinator
            .request_table_creation(accounts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfirmationTimeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_name() {
        let (pending, _storage, coordinator) = setup();
        let other = Table::new("accounts", vec![Column::new("email", DataType::Varchar(64))]);
        let other_commitment = Commitment::for_table(&other);

        let observer = async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            pending.observe(Commitment::for_table(&accounts()));
            pending.observe(other_commitment);
        };
        let (first, second, ()) = tokio::join!(
            coordinator.request_table_creation(accounts()),
            coordinator.request_table_creation(other),
            observer
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(Error::TableConflict(name)) if name == "accounts"));
        assert_eq!(
            coordinator.lookup("accounts").unwrap().columns,
            vec!["id", "owner", "balance"]
        );
        assert_eq!(coordinator.table_names(), vec!["accounts"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_requests() {
        let (pending, storage, coordinator) = setup();
        let commitment = Commitment::for_table(&accounts());

        let observer = async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            pending.observe(commitment);
        };
        let (first, second, ()) = tokio::join!(
            coordinator.request_table_creation(accounts()),
            coordinator.request_table_creation(accounts()),
            observer
        );

        assert_eq!(first.unwrap().commitment, commitment);
        assert!(matches!(second, Err(Error::TableConflict(name)) if name == "accounts"));
        assert_eq!(storage.tables(), vec![accounts()]);
        assert_eq!(coordinator.table_names(), vec!["accounts"]);

        // the loser may resubmit; by then the table exists
        assert!(matches!(
            coordinator.request_table_creation(accounts()).await,
            Err(Error::TableAlreadyExists(_))
        ));
    }

    // Real time on a single-threaded runtime: if the flush ran on the runtime
    // thread, the releasing task could never run and the flush would time out.
    #[tokio::test]
    async fn test_flush_does_not_block_runtime() {
        let (pending, storage, coordinator) = setup();
        let (release, hold) = mpsc::channel();
        *storage.hold.lock().unwrap() = Some(hold);
        pending.observe(Commitment::for_table(&accounts()));

        let releaser = async {
            while !storage.flushing.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            release.send(()).unwrap();
        };
        let (result, ()) = tokio::join!(coordinator.request_table_creation(accounts()), releaser);

        assert!(result.is_ok());
        assert!(coordinator.lookup("accounts").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_names_in_parallel() {
        let (pending, _storage, coordinator) = setup();
        let orders = Table::new("orders", vec![Column::new("id", DataType::BigInt)]);
        let orders_commitment = Commitment::for_table(&orders);

        let observer = async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            pending.observe(orders_commitment);
            tokio::time::sleep(Duration::from_millis(300)).await;
            pending.observe(Commitment::for_table(&accounts()));
        };
        let (a, b, ()) = tokio::join!(
            coordinator.request_table_creation(accounts()),
            coordinator.request_table_creation(orders),
            observer
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(coordinator.table_names(), vec!["accounts", "orders"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recreation_rejected() {
        let (pending, _storage, coordinator) = setup();
        pending.observe(Commitment::for_table(&accounts()));
        coordinator.request_table_creation(accounts()).await.unwrap();

        let err = coordinator
            .request_table_creation(accounts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TableAlreadyExists(name) if name == "accounts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_failure_leaves_registry_untouched() {
        let (pending, storage, coordinator) = setup();
        storage.fail_writes.store(true, Ordering::SeqCst);
        pending.observe(Commitment::for_table(&accounts()));

        let err = coordinator
            .request_table_creation(accounts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageWriteFailure(_)));
        assert!(coordinator.lookup("accounts").is_none());
        assert!(storage.tables().is_empty());

        // recoverable once storage works again
        storage.fail_writes.store(false, Ordering::SeqCst);
        coordinator.request_table_creation(accounts()).await.unwrap();
        assert!(coordinator.lookup("accounts").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_table_rejected_before_polling() {
        let (_pending, _storage, coordinator) = setup();

        let too_wide = Table::new(
            "wide",
            (0..6)
                .map(|i| Column::new(format!("c{i}"), DataType::Integer))
                .collect(),
        );
        let start = tokio::time::Instant::now();
        let err = coordinator.request_table_creation(too_wide).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTable { .. }));
        assert_eq!(start.elapsed(), Duration::ZERO);

        let duplicate = Table::new(
            "dup",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("id", DataType::BigInt),
            ],
        );
        assert!(matches!(
            coordinator.request_table_creation(duplicate).await,
            Err(Error::InvalidTable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_restored_from_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let pending = Arc::new(PendingCommitmentSet::new());
        pending.observe(Commitment::for_table(&accounts()));

        {
            let storage = Arc::new(JsonFileStorage::open(&path, "testdb").unwrap());
            let coordinator = TableCoordinator::new(
                pending.clone(),
                storage,
                policy(),
                CircuitParams::default(),
            );
            coordinator.request_table_creation(accounts()).await.unwrap();
        }

        let storage = Arc::new(JsonFileStorage::open(&path, "testdb").unwrap());
        let coordinator =
            TableCoordinator::new(pending, storage, policy(), CircuitParams::default());
        let entry = coordinator.lookup("accounts").unwrap();
        assert_eq!(entry.commitment, Commitment::for_table(&accounts()));
        assert!(matches!(
            coordinator.request_table_creation(accounts()).await,
            Err(Error::TableAlreadyExists(_))
        ));
    }
}

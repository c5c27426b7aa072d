//! Database management module
//!
//! Table definitions created through the commit-reveal protocol end up here.
//!
//! The database management module consists of:
//! - `schema`: Schema and database structures
//! - `storage`: The durable [`TableStore`] sink and its JSON-file implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use zksql_node::database::{JsonFileStorage, TableStore};
//!
//! let storage = JsonFileStorage::open("data/db.json", "zksql")?;
//! for table in storage.tables() {
//!     println!("{} ({} columns)", table.name, table.num_columns());
//! }
//! # Ok::<(), zksql_node::database::StorageError>(())
//! ```

pub mod schema;
pub mod storage;

pub use schema::{Database, Schema};
pub use storage::{JsonFileStorage, StorageError, TableStore};

//! zkSQL node CLI
//!
//! Command-line interface for running the node and for the client-side
//! commitment and verification steps.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use zksql_node::api::{ApiServer, AppState};
use zksql_node::chain::PendingCommitmentSet;
use zksql_node::commitment::{commit_to_table, Commitment};
use zksql_node::config::NodeConfig;
use zksql_node::coordinator::TableCoordinator;
use zksql_node::database::{JsonFileStorage, TableStore};
use zksql_node::proof::{ProofArtifact, SnarkjsBackend, VerificationKeys, Verifier};
use zksql_node::types::{OperationKind, Table};
use zksql_node::utils::{Helpers, Logger};

#[derive(Parser)]
#[command(name = "zksql_node")]
#[command(about = "Commit-reveal table creation and SQL proof verification", long_about = None)]
#[command(version)]
struct Cli {
    /// Default log level (RUST_LOG overrides it)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP node
    Serve {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Database file
        #[arg(long)]
        storage: Option<PathBuf>,

        /// Verification key directory
        #[arg(long)]
        keys: Option<PathBuf>,

        /// snarkjs executable
        #[arg(long)]
        snarkjs: Option<PathBuf>,

        /// Commitment to treat as already observed on-chain (repeatable)
        #[arg(long = "observe", value_name = "COMMITMENT")]
        observed: Vec<Commitment>,
    },

    /// Compute the commitment to post on-chain before creating a table
    Commit {
        /// Comma-separated column names, in table order
        #[arg(short, long, conflicts_with = "table", required_unless_present = "table")]
        columns: Option<String>,

        /// Table definition JSON file
        #[arg(short, long)]
        table: Option<PathBuf>,
    },

    /// Verify an operation proof locally
    Verify {
        /// Operation kind (select, insert, update, delete)
        #[arg(short, long, conflicts_with = "sql", required_unless_present = "sql")]
        kind: Option<String>,

        /// SQL statement whose operation kind selects the key
        #[arg(long)]
        sql: Option<String>,

        /// Public inputs JSON file (array of decimal strings)
        #[arg(long)]
        public: PathBuf,

        /// Proof JSON file
        #[arg(long)]
        proof: PathBuf,

        /// Verification key directory
        #[arg(long, default_value = "circuits")]
        keys: PathBuf,

        /// snarkjs executable
        #[arg(long, default_value = "snarkjs")]
        snarkjs: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = Logger::parse_level(&cli.log_level)
        .with_context(|| format!("unknown log level {}", cli.log_level))?;
    Logger::init_with_level(level);

    match cli.command {
        Commands::Serve {
            config,
            listen,
            storage,
            keys,
            snarkjs,
            observed,
        } => {
            let mut config = match config {
                Some(path) => NodeConfig::load(&path)?,
                None => NodeConfig::default(),
            };
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(storage) = storage {
                config.storage_path = storage;
            }
            if let Some(keys) = keys {
                config.keys_dir = keys;
            }
            if let Some(snarkjs) = snarkjs {
                config.snarkjs_bin = snarkjs;
            }
            config.validate()?;
            serve(config, observed).await?;
        }
        Commands::Commit { columns, table } => {
            let names = match (columns, table) {
                (Some(columns), _) => Helpers::split_list(&columns),
                (None, Some(path)) => {
                    let contents = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let table: Table = serde_json::from_str(&contents)
                        .with_context(|| format!("failed to parse {}", path.display()))?;
                    table.column_names()
                }
                (None, None) => bail!("either --columns or --table is required"),
            };
            if names.is_empty() {
                bail!("no column names given");
            }

            let commitment = commit_to_table(&names);
            println!("columns:    {}", names.join(", "));
            println!("commitment: {}", commitment.to_hex());
            println!("decimal:    {}", commitment.to_decimal());
        }
        Commands::Verify {
            kind,
            sql,
            public,
            proof,
            keys,
            snarkjs,
        } => {
            let kind = match (kind, sql) {
                (Some(tag), _) => tag.parse::<OperationKind>()?,
                (None, Some(sql)) => OperationKind::from_sql(&sql)?,
                (None, None) => bail!("either --kind or --sql is required"),
            };
            let public_inputs: Vec<String> = read_json(&public)?;
            let proof: ProofArtifact = read_json(&proof)?;

            let verifier = Verifier::new(
                VerificationKeys::load_dir(&keys)?,
                Arc::new(SnarkjsBackend::new(snarkjs)),
            );
            let start = Instant::now();
            let valid = verifier.verify(kind, &public_inputs, &proof).await?;
            println!(
                "{} proof {} ({})",
                kind,
                if valid { "valid" } else { "INVALID" },
                Helpers::format_duration(start.elapsed())
            );
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn serve(config: NodeConfig, observed: Vec<Commitment>) -> anyhow::Result<()> {
    let storage = Arc::new(
        JsonFileStorage::open(&config.storage_path, "zksql")
            .with_context(|| format!("failed to open {}", config.storage_path.display()))?,
    );
    log::info!(
        "database {} holds {} tables",
        storage.path().display(),
        storage.tables().len()
    );

    let pending = Arc::new(PendingCommitmentSet::new());
    for commitment in observed {
        pending.observe(commitment);
    }

    let coordinator = Arc::new(TableCoordinator::new(
        pending,
        storage,
        config.confirmation.policy(),
        config.circuit,
    ));
    let verifier = Verifier::new(
        VerificationKeys::load_dir(&config.keys_dir)?,
        Arc::new(SnarkjsBackend::new(config.snarkjs_bin.clone())),
    );

    let state = Arc::new(AppState {
        coordinator,
        verifier,
    });
    ApiServer::new(config.listen_addr, state)
        .start()
        .await
        .with_context(|| format!("server on {} failed", config.listen_addr))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

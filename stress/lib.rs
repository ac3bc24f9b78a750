pub mod config;
pub mod connection;
pub mod driver;
pub mod mysql;
pub mod opts;
pub mod pool;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sql_generation::Table;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use config::WorkloadConfig;
pub use connection::{Connection, Connector, ExecError};
pub use driver::{Driver, DriverStats};
pub use pool::{Worker, WorkerStats};

/// Summary of a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub seed: u64,
    pub driver: DriverStats,
    pub totals: WorkerStats,
    pub workers: Vec<WorkerStats>,
    /// Rows in the shadow table when the last worker exited.
    pub shadow_rows: usize,
}

impl RunStats {
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write stats to {}", path.display()))
    }
}

/// Introspect the target table and build its (empty) shadow.
pub async fn load_table<C: Connector>(
    config: &WorkloadConfig,
    connector: &C,
) -> anyhow::Result<Arc<Table>> {
    let schema = connector
        .load_schema(&config.db, &config.table)
        .await
        .with_context(|| format!("failed to load schema of `{}`.`{}`", config.db, config.table))?;
    let table = Table::from_schema(&config.db, &config.table, &schema)?;
    info!(
        table = %table.qualified_name(),
        columns = table.columns.len(),
        "loaded table"
    );
    Ok(Arc::new(table))
}

/// Run the driver and the worker pool against `table` until the queue is drained.
pub async fn run_workload<C: Connector>(
    config: Arc<WorkloadConfig>,
    connector: Arc<C>,
    table: Arc<Table>,
) -> anyhow::Result<RunStats> {
    info!(
        concurrency = config.concurrency,
        txn = config.txn_size,
        rounds = config.rounds,
        seed = config.seed,
        "starting workload"
    );
    let (tx, rx) = mpsc::channel(config.concurrency);
    let queue = Arc::new(Mutex::new(rx));

    let mut workers = JoinSet::new();
    for id in 0..config.concurrency {
        let worker = Worker::new(id, connector.clone(), config.clone(), queue.clone());
        workers.spawn(worker.run());
    }
    // Only workers may hold the receiver, so the driver notices when they are all gone.
    drop(queue);

    let driver = Driver::new(
        table.clone(),
        config.rounds,
        ChaCha8Rng::seed_from_u64(config.seed),
        tx,
    );
    // A failed worker drops the receiver, which also fails the driver; report the worker.
    let (driver, workers) = tokio::join!(driver.run(), join_workers(workers));
    let workers = workers?;
    let driver = driver?;

    let mut totals = WorkerStats::default();
    for stats in &workers {
        totals += *stats;
    }
    let stats = RunStats {
        seed: config.seed,
        driver,
        totals,
        workers,
        shadow_rows: table.number_of_rows(),
    };
    info!(driver = ?stats.driver, totals = ?stats.totals, shadow_rows = stats.shadow_rows, "workload finished");
    Ok(stats)
}

pub async fn run<C: Connector>(
    config: Arc<WorkloadConfig>,
    connector: Arc<C>,
) -> anyhow::Result<RunStats> {
    config.validate()?;
    let table = load_table(&config, connector.as_ref()).await?;
    run_workload(config, connector, table).await
}

/// Wait for every worker. The first failure aborts the ones still running.
async fn join_workers(
    mut workers: JoinSet<anyhow::Result<WorkerStats>>,
) -> anyhow::Result<Vec<WorkerStats>> {
    let mut stats = Vec::with_capacity(workers.len());
    while let Some(result) = workers.join_next().await {
        stats.push(result.context("worker task panicked")??);
    }
    Ok(stats)
}

/// Log to `log_file` (appending) or to stderr, filtered by `RUST_LOG`.
pub fn init_tracing(log_file: Option<&Path>, verbose: bool) -> anyhow::Result<WorkerGuard> {
    let writer: Box<dyn Write + Send> = match log_file {
        Some(path) => Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?,
        ),
        None => Box::new(std::io::stderr()),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .try_init()
    {
        println!("Unable to setup tracing appender: {e:?}");
    }
    Ok(guard)
}

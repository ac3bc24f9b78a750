use std::ops::AddAssign;
use std::sync::Arc;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sql_generation::model::query::{Begin, Commit};
use sql_generation::DmlTask;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::config::WorkloadConfig;
use crate::connection::{connect_with_retry, Connection, Connector, ExecError};

/// The receiving end of the task queue, shared by every worker.
pub type TaskQueue = Arc<Mutex<mpsc::Receiver<DmlTask>>>;

/// Per-worker seed, so that workers sharing a base seed draw different streams.
pub fn worker_seed(seed: u64, id: usize) -> u64 {
    seed ^ (id as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub statements_ok: usize,
    /// DML statements and `BEGIN`s the server rejected.
    pub statements_failed: usize,
    pub batches_committed: usize,
    pub commits_failed: usize,
    pub reconnects: usize,
    /// Rows appended, updated or removed in the shadow table.
    pub shadow_rows_affected: usize,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.statements_ok += other.statements_ok;
        self.statements_failed += other.statements_failed;
        self.batches_committed += other.batches_committed;
        self.commits_failed += other.commits_failed;
        self.reconnects += other.reconnects;
        self.shadow_rows_affected += other.shadow_rows_affected;
    }
}

/// Pulls tasks off the queue and runs them in transactions of `batch_size` statements.
///
/// Statements that fail are dropped from the batch. The statements that succeeded are
/// mirrored into the shadow table, in execution order, once their `COMMIT` succeeds; a
/// failed `COMMIT` mirrors nothing.
pub struct Worker<C: Connector> {
    id: usize,
    connector: Arc<C>,
    config: Arc<WorkloadConfig>,
    queue: TaskQueue,
    rng: ChaCha8Rng,
    batch_size: usize,
    stats: WorkerStats,
}

impl<C: Connector> Worker<C> {
    pub fn new(id: usize, connector: Arc<C>, config: Arc<WorkloadConfig>, queue: TaskQueue) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(worker_seed(config.seed, id));
        let batch_size = rng.random_range(1..=config.txn_size.max(1));
        Self {
            id,
            connector,
            config,
            queue,
            rng,
            batch_size,
            stats: WorkerStats::default(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn next_task(&self) -> Option<DmlTask> {
        self.queue.lock().await.recv().await
    }

    pub async fn run(mut self) -> anyhow::Result<WorkerStats> {
        let mut conn = self.dial().await?;
        info!(worker = self.id, batch_size = self.batch_size, "worker started");

        let mut executed: Vec<DmlTask> = Vec::with_capacity(self.batch_size);
        let mut attempted = 0;
        while let Some(task) = self.next_task().await {
            if attempted == 0 {
                // A failed BEGIN leaves the session in autocommit; the batch still runs.
                if self.exec(&mut conn, &Begin.to_string()).await.is_err() {
                    self.stats.statements_failed += 1;
                }
            }
            match self.exec(&mut conn, &task.sql).await {
                Ok(()) => {
                    self.stats.statements_ok += 1;
                    executed.push(task);
                }
                Err(_) => self.stats.statements_failed += 1,
            }
            attempted += 1;

            if attempted >= self.batch_size {
                let broken = self.commit(&mut conn, &mut executed).await?;
                attempted = 0;
                conn = self.maybe_reconnect(conn, broken).await?;
            }
        }
        if attempted > 0 {
            self.commit(&mut conn, &mut executed).await?;
        }

        if let Err(e) = conn.close().await {
            warn!(worker = self.id, error = %e, "failed to close connection");
        }
        info!(worker = self.id, stats = ?self.stats, "worker finished");
        Ok(self.stats)
    }

    async fn dial(&self) -> anyhow::Result<C::Conn> {
        connect_with_retry(self.connector.as_ref(), self.config.dial_attempts)
            .await
            .with_context(|| {
                format!(
                    "worker {} could not connect after {} attempts",
                    self.id, self.config.dial_attempts
                )
            })
    }

    async fn exec(&self, conn: &mut C::Conn, sql: &str) -> Result<(), ExecError> {
        match conn.execute(sql).await {
            Ok(()) => {
                info!(worker = self.id, sql, "[dml]");
                Ok(())
            }
            Err(e) => {
                warn!(worker = self.id, sql, error = %e, "[dml]");
                Err(e)
            }
        }
    }

    /// Commit the open batch and mirror it on success. Returns whether the session
    /// looks unusable.
    async fn commit(
        &mut self,
        conn: &mut C::Conn,
        executed: &mut Vec<DmlTask>,
    ) -> anyhow::Result<bool> {
        match self.exec(conn, &Commit.to_string()).await {
            Ok(()) => {
                self.stats.batches_committed += 1;
                for task in executed.drain(..) {
                    let affected = task
                        .apply_to_shadow()
                        .with_context(|| format!("failed to mirror `{}`", task.sql))?;
                    debug!(worker = self.id, kind = %task.kind(), affected, "mirrored");
                    self.stats.shadow_rows_affected += affected;
                }
                Ok(false)
            }
            Err(e) => {
                self.stats.commits_failed += 1;
                executed.clear();
                Ok(matches!(e, ExecError::Driver(_)))
            }
        }
    }

    /// Replace the session now and then, and always when it looks broken.
    async fn maybe_reconnect(&mut self, conn: C::Conn, broken: bool) -> anyhow::Result<C::Conn> {
        if !broken && !self.rng.random_bool(self.config.reconnect_probability) {
            return Ok(conn);
        }
        let fresh = self.dial().await?;
        if let Err(e) = conn.close().await {
            warn!(worker = self.id, error = %e, "failed to close replaced connection");
        }
        self.stats.reconnects += 1;
        info!(worker = self.id, broken, "reconnected");
        Ok(fresh)
    }
}

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sql_generation::{DmlKind, DmlTask, Table};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tracing::info;

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    pub rounds: usize,
    pub tasks_generated: usize,
    /// Builds that had nothing to do, such as an UPDATE against an empty shadow.
    pub tasks_skipped: usize,
}

/// Feeds the task queue: every round builds one task of each kind, in a fresh random
/// order. Dropping the sender at the end closes the queue.
pub struct Driver {
    table: Arc<Table>,
    rounds: usize,
    rng: ChaCha8Rng,
    tx: mpsc::Sender<DmlTask>,
}

impl Driver {
    pub fn new(table: Arc<Table>, rounds: usize, rng: ChaCha8Rng, tx: mpsc::Sender<DmlTask>) -> Self {
        Self {
            table,
            rounds,
            rng,
            tx,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<DriverStats> {
        let mut stats = DriverStats::default();
        let mut kinds = DmlKind::iter().collect::<Vec<_>>();
        for round in 0..self.rounds {
            kinds.shuffle(&mut self.rng);
            for kind in &kinds {
                let Some(task) = kind.build(&self.table, &mut self.rng) else {
                    stats.tasks_skipped += 1;
                    continue;
                };
                // Blocks while the queue is full.
                if self.tx.send(task).await.is_err() {
                    anyhow::bail!("task queue closed by the workers in round {round}");
                }
                stats.tasks_generated += 1;
            }
            stats.rounds += 1;
            if stats.rounds % PROGRESS_INTERVAL == 0 {
                info!(
                    rounds = stats.rounds,
                    shadow_rows = self.table.number_of_rows(),
                    "driver progress"
                );
            }
        }
        info!(?stats, "driver finished, closing task queue");
        Ok(stats)
    }
}

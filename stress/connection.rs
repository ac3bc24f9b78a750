use std::time::Duration;

use async_trait::async_trait;
use sql_generation::SchemaColumn;
use thiserror::Error;
use tracing::{info, warn};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DIAL_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: BoxError,
    },
    /// The server rejected a statement.
    #[error("{0}")]
    Statement(String),
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),
}

/// A single session against the target database.
#[async_trait]
pub trait Connection: Send + Sized + 'static {
    /// Run one statement and discard any result rows.
    async fn execute(&mut self, sql: &str) -> Result<(), ExecError>;

    async fn close(self) -> Result<(), ExecError>;
}

/// Dials sessions and introspects the target table.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    async fn connect(&self) -> Result<Self::Conn, ExecError>;

    /// Columns of `db`.`table` in declaration order. Empty if the table does not exist.
    async fn load_schema(&self, db: &str, table: &str) -> Result<Vec<SchemaColumn>, ExecError>;
}

/// Dial until a session is established, giving up after `attempts` failures.
pub async fn connect_with_retry<C: Connector>(
    connector: &C,
    attempts: usize,
) -> Result<C::Conn, ExecError> {
    let mut attempt = 1;
    loop {
        match connector.connect().await {
            Ok(conn) => {
                info!(attempt, "new connection");
                return Ok(conn);
            }
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!(attempt, error = %e, "dial failed, retrying");
                attempt += 1;
                tokio::time::sleep(DIAL_BACKOFF).await;
            }
        }
    }
}

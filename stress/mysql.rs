use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder};
use sql_generation::SchemaColumn;

use crate::config::WorkloadConfig;
use crate::connection::{Connection, Connector, ExecError};

const SCHEMA_QUERY: &str = "SELECT column_name, column_type, column_key, column_default \
     FROM information_schema.columns \
     WHERE lower(table_schema) = lower(?) AND lower(table_name) = lower(?) \
     ORDER BY ordinal_position";

/// Dials `user@addr/db` over the MySQL wire protocol.
pub struct MySqlConnector {
    config: Arc<WorkloadConfig>,
    host: String,
    port: u16,
}

impl MySqlConnector {
    pub fn new(config: Arc<WorkloadConfig>) -> anyhow::Result<Self> {
        let (host, port) = config.host_port()?;
        let host = host.to_string();
        Ok(Self { config, host, port })
    }

    fn opts(&self) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.passwd.clone()))
            .db_name(Some(self.config.db.clone()))
    }

    async fn dial(&self) -> Result<Conn, ExecError> {
        Conn::new(self.opts())
            .await
            .map_err(|e| ExecError::Connect {
                addr: self.config.addr.clone(),
                source: Box::new(e),
            })
    }
}

fn exec_error(e: mysql_async::Error) -> ExecError {
    match e {
        mysql_async::Error::Server(e) => ExecError::Statement(e.to_string()),
        e => ExecError::Driver(Box::new(e)),
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Conn = MySqlConnection;

    async fn connect(&self) -> Result<MySqlConnection, ExecError> {
        Ok(MySqlConnection {
            conn: self.dial().await?,
        })
    }

    async fn load_schema(&self, db: &str, table: &str) -> Result<Vec<SchemaColumn>, ExecError> {
        let mut conn = self.dial().await?;
        let rows: Vec<(String, String, String, Option<String>)> = conn
            .exec(SCHEMA_QUERY, (db, table))
            .await
            .map_err(exec_error)?;
        conn.disconnect().await.map_err(exec_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, column_type, key, default)| SchemaColumn {
                name,
                column_type,
                primary_key: key.eq_ignore_ascii_case("PRI"),
                default,
            })
            .collect())
    }
}

pub struct MySqlConnection {
    conn: Conn,
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), ExecError> {
        self.conn.query_drop(sql).await.map_err(exec_error)
    }

    async fn close(self) -> Result<(), ExecError> {
        self.conn.disconnect().await.map_err(exec_error)
    }
}

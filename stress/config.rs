use crate::opts::Opts;

/// Probability that a worker replaces its connection after a batch boundary.
pub const RECONNECT_PROBABILITY: f64 = 0.001;

/// Dial attempts before a connection failure becomes fatal.
pub const DIAL_ATTEMPTS: usize = 20;

/// Everything the pool and the connector need, built once from the command line.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub db: String,
    pub table: String,
    pub addr: String,
    pub user: String,
    pub passwd: String,
    pub concurrency: usize,
    /// Upper bound of a worker's batch size; each worker draws its own in `[1, txn_size]`.
    pub txn_size: usize,
    pub rounds: usize,
    pub seed: u64,
    pub reconnect_probability: f64,
    pub dial_attempts: usize,
}

impl WorkloadConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db.is_empty() || self.table.is_empty() {
            anyhow::bail!("Database and table names must not be empty");
        }

        if self.concurrency == 0 {
            anyhow::bail!("Concurrency must be greater than 0");
        }

        if self.txn_size == 0 {
            anyhow::bail!("Transaction size must be greater than 0");
        }

        if self.rounds == 0 {
            anyhow::bail!("Number of rounds must be greater than 0");
        }

        if self.dial_attempts == 0 {
            anyhow::bail!("Dial attempts must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.reconnect_probability) {
            anyhow::bail!("Reconnect probability must be between 0 and 1");
        }

        self.host_port()?;

        Ok(())
    }

    /// Split `addr` into host and port.
    pub fn host_port(&self) -> anyhow::Result<(&str, u16)> {
        let Some((host, port)) = self.addr.rsplit_once(':') else {
            anyhow::bail!("Address `{}` is not host:port", self.addr);
        };
        anyhow::ensure!(!host.is_empty(), "Address `{}` has no host", self.addr);
        let port = port
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Address `{}` has an invalid port: {e}", self.addr))?;
        Ok((host, port))
    }
}

impl From<&Opts> for WorkloadConfig {
    fn from(opts: &Opts) -> Self {
        Self {
            db: opts.db.clone(),
            table: opts.table.clone(),
            addr: opts.addr.clone(),
            user: opts.user.clone(),
            passwd: opts.passwd.clone(),
            concurrency: opts.concurrency,
            txn_size: opts.txn,
            rounds: opts.rounds,
            seed: opts.seed.unwrap_or_else(rand::random),
            reconnect_probability: RECONNECT_PROBABILITY,
            dial_attempts: DIAL_ATTEMPTS,
        }
    }
}

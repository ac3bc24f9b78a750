use std::path::PathBuf;

use clap::{command, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "randdml_stress")]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    /// Verbose mode
    #[clap(short = 'v', long, help = "verbose mode")]
    pub verbose: bool,

    #[clap(long, help = "target database name", default_value = "test")]
    pub db: String,

    #[clap(long, help = "target table name", default_value = "t")]
    pub table: String,

    #[clap(long, help = "host:port of the database endpoint", default_value = "127.0.0.1:4000")]
    pub addr: String,

    #[clap(long, help = "user to authenticate as", default_value = "root")]
    pub user: String,

    #[clap(long, help = "password of the user", default_value = "")]
    pub passwd: String,

    /// Number of workers, which is also the task queue capacity
    #[clap(short = 'c', long, help = "the number of parallel workers", default_value_t = 12)]
    pub concurrency: usize,

    #[clap(long, help = "upper bound on the statements in one transaction", default_value_t = 50)]
    pub txn: usize,

    /// Each round issues one task of every kind
    #[clap(short = 'r', long, help = "the number of workload rounds", default_value_t = 1_000_000)]
    pub rounds: usize,

    /// Random seed for reproducibility
    #[clap(long, help = "Random seed for reproducibility")]
    pub seed: Option<u64>,

    #[clap(short = 'l', long, help = "log file for executed statements, stderr if unset")]
    pub log_file: Option<PathBuf>,

    #[clap(long, help = "write a JSON run summary to this file")]
    pub stats_file: Option<PathBuf>,
}

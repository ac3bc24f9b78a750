use std::sync::Arc;

use clap::Parser;
use randdml_stress::mysql::MySqlConnector;
use randdml_stress::opts::Opts;
use randdml_stress::{init_tracing, run, WorkloadConfig};

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let config = WorkloadConfig::from(&opts);
    println!("Using seed: {}", config.seed);
    config.validate()?;

    let _guard = init_tracing(opts.log_file.as_deref(), opts.verbose)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let config = Arc::new(config);
    let connector = Arc::new(MySqlConnector::new(config.clone())?);
    let stats = rt.block_on(run(config, connector))?;

    if let Some(path) = &opts.stats_file {
        stats.write_json(path)?;
        println!("Stats written to {}", path.display());
    }
    println!(
        "Done. {} statements ok, {} failed, {} batches committed, {} rows in shadow",
        stats.totals.statements_ok,
        stats.totals.statements_failed,
        stats.totals.batches_committed,
        stats.shadow_rows
    );
    Ok(())
}

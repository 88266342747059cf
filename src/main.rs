//! Command-line driver: runs the producer/consumer harness with configuration taken
//! from the environment (and `.env`, if present).

use aging_scheduler::config::HarnessConfig;
use aging_scheduler::core::AppResult;
use aging_scheduler::runtime::Harness;
use aging_scheduler::util::init_tracing;
use anyhow::{anyhow, Context};
use tracing::warn;

fn main() -> AppResult<()> {
    // Loads `.env` as well, so it runs before tracing picks up `RUST_LOG`.
    let config = HarnessConfig::from_env()
        .map_err(|e| anyhow!(e))
        .context("loading harness configuration")?;
    init_tracing();

    let report = Harness::new(config)?.run()?;

    for failure in &report.join_failures {
        warn!(
            role = %failure.role,
            worker_id = failure.worker_id,
            kind = ?failure.kind,
            "Worker did not shut down cleanly"
        );
    }

    println!(
        "run {}: produced={} consumed={} promoted={} leftover={} elapsed={:?}",
        report.run_id,
        report.produced,
        report.consumed,
        report.queue_stats.promoted,
        report.leftover,
        report.elapsed
    );
    Ok(())
}

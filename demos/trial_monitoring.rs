//! Trial Monitoring Example
//!
//! Simulates a two-arm trial monitored with an O'Brien-Fleming efficacy
//! boundary. Monitoring stops halfway (a process restart), resumes from the
//! checkpoint and runs until the boundary is crossed or enrolment ends.
//!
//! Run with: RUST_LOG=earlysign=info cargo run --example trial_monitoring

use anyhow::Context;
use earlysign::design::{
    ExperimentDesigner, GroupSequentialDesign, OBrienFlemingDesigner, EFFICACY_BOUNDARY,
};
use earlysign::experiment::{Reporter, SequentialTest};
use earlysign::kv::MemoryKvStore;
use earlysign::repository::KvStateRepository;
use earlysign::statistic::ProportionObservation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const EXPERIMENT_ID: &str = "trial-001";
const MAX_SAMPLES: u64 = 600;
const TREATMENT_RATE: f64 = 0.62;
const CONTROL_RATE: f64 = 0.45;

type Repository = KvStateRepository<MemoryKvStore>;

/// Feed `observations` pairs, stopping early if the boundary is crossed.
fn monitor(
    test: &mut SequentialTest<u64, ProportionObservation>,
    rng: &mut StdRng,
    start: u64,
    observations: u64,
) -> Option<u64> {
    for t in start..start + observations {
        let pair = (rng.gen_bool(TREATMENT_RATE), rng.gen_bool(CONTROL_RATE));
        let status = test.consume(t, pair);

        if t % 50 == 0 {
            println!(
                "   t={t:>3}  info={:.2}  z={:+.3}",
                status.information_time(),
                status.statistic_value().unwrap_or(0.0)
            );
        }
        for event in status.triggered_signals() {
            println!("   >>> t={} {} {}", event.time(), event.condition_name(), event.signal());
        }
        if status.is_active(EFFICACY_BOUNDARY) == Some(true) {
            return Some(t);
        }
    }
    None
}

async fn open(
    design: &GroupSequentialDesign,
    repository: &Repository,
) -> anyhow::Result<SequentialTest<u64, ProportionObservation>> {
    design
        .instantiate_proportions(EXPERIMENT_ID, repository)
        .await
        .context("failed to open the monitored trial")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== earlysign Trial Monitoring ===\n");

    // -------------------------------------------------------------------------
    // 1. Design
    // -------------------------------------------------------------------------
    let design = OBrienFlemingDesigner::new(MAX_SAMPLES, 0.05)?.create_design();
    println!("1. Design: {}", design.name());
    println!("   {}", design.description());
    println!("   {}\n", serde_json::to_string(&design)?);

    let repository = KvStateRepository::new(MemoryKvStore::new());
    let mut rng = StdRng::seed_from_u64(2024);
    let pairs_per_arm = MAX_SAMPLES / 2;

    // -------------------------------------------------------------------------
    // 2. First half of enrolment, then checkpoint
    // -------------------------------------------------------------------------
    println!("2. Monitoring first half...");
    let mut test = open(&design, &repository).await?;
    let mut crossed = monitor(&mut test, &mut rng, 0, pairs_per_arm / 2);
    test.save_checkpoint(&repository)
        .await
        .context("failed to save checkpoint")?;
    println!("   Checkpoint saved after {} looks\n", test.statistic().history().len());
    drop(test);

    // -------------------------------------------------------------------------
    // 3. Restart: resume from the checkpoint and continue
    // -------------------------------------------------------------------------
    println!("3. Resuming after restart...");
    let mut test = open(&design, &repository).await?;
    println!("   Resumed with {} looks of history", test.statistic().history().len());
    if crossed.is_none() {
        let start = test.statistic().history().len() as u64;
        crossed = monitor(&mut test, &mut rng, start, pairs_per_arm - start);
    }
    test.save_checkpoint(&repository).await?;

    // -------------------------------------------------------------------------
    // 4. Report
    // -------------------------------------------------------------------------
    println!("\n4. Report");
    match crossed {
        Some(t) => println!("   Efficacy boundary crossed at t={t}"),
        None => println!("   Efficacy boundary not crossed"),
    }
    let reporter = Reporter::new(test.signal_history());
    println!("{}", reporter.generate_summary());
    println!("Recommendation: {}", reporter.recommendation().description());

    Ok(())
}

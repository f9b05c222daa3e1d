//! Checkpoint/resume equivalence for the experiment runner
//!
//! A runner restored from `get_state()` at any split point must produce the
//! same statuses, signal history and final state as one that never stopped,
//! both in memory and through the JSON-backed repository.

use earlysign::condition::{
    AlphaSpendingCondition, Condition, ConditionState, EValueThresholdCondition,
};
use earlysign::experiment::{
    BoxedCondition, BoxedStatistic, ExperimentState, ExperimentStatus, SequentialTest, Signal,
};
use earlysign::kv::MemoryKvStore;
use earlysign::repository::{KvStateRepository, MemoryStateRepository, StateRepository};
use earlysign::spending::{HwangShihDeCaniSpending, OBrienFlemingSpending};
use earlysign::statistic::{
    MeanObservation, MeansTStatistic, ProportionObservation, ProportionsZStatistic,
    StatisticSnapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Fixtures
// ============================================================================

/// Non-absorbing condition: active while the statistic exceeds a level.
#[derive(Debug)]
struct AboveLevel(f64);

impl Condition for AboveLevel {
    fn is_active(&mut self, statistic: &StatisticSnapshot) -> bool {
        statistic.value.is_some_and(|v| v > self.0)
    }

    fn is_absorbing(&self) -> bool {
        false
    }

    fn get_state(&self) -> ConditionState {
        ConditionState::Stateless
    }

    fn load_state(&mut self, _state: ConditionState) -> earlysign::Result<()> {
        Ok(())
    }
}

fn named(name: &str, condition: impl Condition + 'static) -> (String, BoxedCondition) {
    let condition: BoxedCondition = Box::new(condition);
    (name.to_string(), condition)
}

fn conditions() -> Vec<(String, BoxedCondition)> {
    let obrien_fleming = Box::new(OBrienFlemingSpending::new(0.05).unwrap());
    let linear = Box::new(HwangShihDeCaniSpending::linear(0.025).unwrap());
    vec![
        named(
            "efficacy_boundary",
            AlphaSpendingCondition::from_spending(obrien_fleming),
        ),
        named(
            "linear_boundary",
            AlphaSpendingCondition::new(0.025, linear).unwrap(),
        ),
        named("evidence", EValueThresholdCondition::new(0.2).unwrap()),
        named("trend", AboveLevel(1.0)),
    ]
}

fn proportions_runner(id: &str) -> SequentialTest<u64, ProportionObservation> {
    let statistic: BoxedStatistic<u64, ProportionObservation> =
        Box::new(ProportionsZStatistic::new(240));
    SequentialTest::new(id, statistic, conditions()).unwrap()
}

fn means_runner(id: &str) -> SequentialTest<u64, MeanObservation> {
    let statistic: BoxedStatistic<u64, MeanObservation> = Box::new(MeansTStatistic::new(160));
    SequentialTest::new(id, statistic, conditions()).unwrap()
}

/// Response rates drift apart, then reverse, so conditions toggle.
fn proportion_stream() -> Vec<(u64, ProportionObservation)> {
    let mut rng = StdRng::seed_from_u64(11);
    (0..120_u64)
        .map(|t| {
            let (p1, p2) = if t < 60 { (0.65, 0.35) } else { (0.2, 0.8) };
            (t, (rng.gen_bool(p1), rng.gen_bool(p2)))
        })
        .collect()
}

fn mean_stream() -> Vec<(u64, MeanObservation)> {
    let mut rng = StdRng::seed_from_u64(23);
    (0..80_u64)
        .map(|t| {
            let shift = if t < 50 { 0.6 } else { -0.2 };
            (t, (shift + rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5)))
        })
        .collect()
}

fn run_all<O: Copy>(
    runner: &mut SequentialTest<u64, O>,
    stream: &[(u64, O)],
) -> Vec<ExperimentStatus<u64>> {
    stream.iter().map(|&(t, o)| runner.consume(t, o)).collect()
}

// ============================================================================
// In-memory get_state / load_state
// ============================================================================

#[test]
fn test_proportion_stream_toggles_conditions() {
    let stream = proportion_stream();
    let mut runner = proportions_runner("sanity");
    run_all(&mut runner, &stream);

    // The fixture is only useful if something actually fires and ends
    let history = runner.signal_history();
    assert!(history.iter().any(|e| e.signal() == Signal::ConditionMet));
    assert!(history
        .iter()
        .any(|e| e.condition_name() == "trend" && e.signal() == Signal::ConditionEnded));
}

#[test]
fn test_checkpoint_equivalence_every_split_proportions() {
    let stream = proportion_stream();
    let mut reference = proportions_runner("trial");
    let expected = run_all(&mut reference, &stream);

    for k in 0..=stream.len() {
        let mut first = proportions_runner("trial");
        run_all(&mut first, &stream[..k]);
        let checkpoint = first.get_state();
        drop(first);

        let mut resumed = proportions_runner("trial");
        resumed.load_state(checkpoint).unwrap();
        let tail = run_all(&mut resumed, &stream[k..]);

        assert_eq!(tail, expected[k..], "split at {k}");
        assert_eq!(resumed.signal_history(), reference.signal_history(), "split at {k}");
        assert_eq!(resumed.get_state(), reference.get_state(), "split at {k}");
    }
}

#[test]
fn test_checkpoint_equivalence_every_split_means() {
    let stream = mean_stream();
    let mut reference = means_runner("trial");
    let expected = run_all(&mut reference, &stream);

    for k in 0..=stream.len() {
        let mut first = means_runner("trial");
        run_all(&mut first, &stream[..k]);

        let mut resumed = means_runner("trial");
        resumed.load_state(first.get_state()).unwrap();
        let tail = run_all(&mut resumed, &stream[k..]);

        assert_eq!(tail, expected[k..], "split at {k}");
        assert_eq!(resumed.get_state(), reference.get_state(), "split at {k}");
    }
}

#[test]
fn test_absorbing_boundary_survives_checkpoint() {
    let mut runner = proportions_runner("absorbing");

    // Overwhelming early effect crosses the O'Brien-Fleming boundary
    for t in 0..40_u64 {
        runner.consume(t, (true, false));
    }
    // Then the effect vanishes completely
    let mut last = None;
    for t in 40..80_u64 {
        last = Some(runner.consume(t, (false, true)));
    }
    let last = last.unwrap();
    assert_eq!(last.statistic_value(), Some(0.0));
    assert_eq!(last.is_active("efficacy_boundary"), Some(true));

    let mut resumed = proportions_runner("absorbing");
    resumed.load_state(runner.get_state()).unwrap();
    for t in 80..85_u64 {
        let status = resumed.consume(t, (false, true));
        assert!(status.statistic_value().unwrap() < 0.0);
        assert_eq!(status.is_active("efficacy_boundary"), Some(true));
        assert!(status
            .triggered_signals()
            .iter()
            .all(|e| e.condition_name() != "efficacy_boundary"));
    }

    let efficacy_events: Vec<_> = resumed
        .signal_history()
        .iter()
        .filter(|e| e.condition_name() == "efficacy_boundary")
        .collect();
    assert_eq!(efficacy_events.len(), 1);
    assert_eq!(efficacy_events[0].signal(), Signal::ConditionMet);
}

// ============================================================================
// Through repositories
// ============================================================================

async fn split_through_repository<R: StateRepository<u64>>(repository: &R, k: usize) {
    let stream = proportion_stream();
    let mut reference = proportions_runner("reference");
    let expected = run_all(&mut reference, &stream);

    let id = format!("split-{k}");
    let mut first = proportions_runner(&id);
    run_all(&mut first, &stream[..k]);
    first.save_checkpoint(repository).await.unwrap();
    drop(first);

    let statistic: BoxedStatistic<u64, ProportionObservation> =
        Box::new(ProportionsZStatistic::new(240));
    let mut resumed = SequentialTest::resume_from(id, statistic, conditions(), repository)
        .await
        .unwrap();
    let tail = run_all(&mut resumed, &stream[k..]);

    assert_eq!(tail, expected[k..], "split at {k}");
    assert_eq!(resumed.signal_history(), reference.signal_history(), "split at {k}");
}

#[tokio::test]
async fn test_checkpoint_equivalence_through_json_repository() {
    let repository = KvStateRepository::new(MemoryKvStore::new());
    for k in 0..=proportion_stream().len() {
        split_through_repository(&repository, k).await;
    }
    assert_eq!(repository.inner().len(), proportion_stream().len() + 1);
}

#[tokio::test]
async fn test_checkpoint_equivalence_through_memory_repository() {
    let repository = MemoryStateRepository::new();
    for k in [0, 1, 37, 60, 119, 120] {
        split_through_repository(&repository, k).await;
    }
}

#[tokio::test]
async fn test_means_checkpoint_is_bit_exact_through_json() {
    let stream = mean_stream();
    let repository = KvStateRepository::new(MemoryKvStore::new());

    let mut runner = means_runner("welch");
    run_all(&mut runner, &stream[..33]);
    runner.save_checkpoint(&repository).await.unwrap();

    let loaded: ExperimentState<u64> = repository.load("welch").await.unwrap();
    assert_eq!(loaded, runner.get_state());
}

#[tokio::test]
async fn test_resume_from_cold_start() {
    let repository = MemoryStateRepository::new();
    let statistic: BoxedStatistic<u64, ProportionObservation> =
        Box::new(ProportionsZStatistic::new(240));

    let runner = SequentialTest::resume_from("fresh", statistic, conditions(), &repository)
        .await
        .unwrap();

    assert!(runner.signal_history().is_empty());
    assert!(runner.statistic().history().is_empty());
    assert!(runner.condition_states().values().all(|active| !active));
    assert!(!repository.exists("fresh").await.unwrap());
}

#[tokio::test]
async fn test_resume_from_rejects_wrong_statistic() {
    let repository = MemoryStateRepository::new();
    let mut runner = proportions_runner("mixed");
    runner.consume(0, (true, false));
    runner.save_checkpoint(&repository).await.unwrap();

    let statistic: BoxedStatistic<u64, MeanObservation> = Box::new(MeansTStatistic::new(160));
    let result = SequentialTest::resume_from("mixed", statistic, conditions(), &repository).await;
    assert!(matches!(result, Err(earlysign::Error::StateMismatch { .. })));
}

#[tokio::test]
async fn test_runner_moves_into_task() {
    let repository = std::sync::Arc::new(KvStateRepository::new(MemoryKvStore::new()));
    let mut runner = proportions_runner("spawned");

    let handle = tokio::spawn({
        let repository = std::sync::Arc::clone(&repository);
        async move {
            for (t, observation) in proportion_stream() {
                runner.consume(t, observation);
            }
            runner.save_checkpoint(repository.as_ref()).await.unwrap();
            runner.signal_history().len()
        }
    });

    let signals = handle.await.unwrap();
    let state = StateRepository::<u64>::load(repository.as_ref(), "spawned").await.unwrap();
    assert_eq!(state.signal_history.len(), signals);
    assert_eq!(state.observations(), 120);
}

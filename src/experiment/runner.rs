//! Sequential test runner
//!
//! Feeds observations to the statistic, evaluates every named condition,
//! turns condition edges into [`SignalEvent`]s and assembles checkpoints.
//!
//! ```text
//! consume(time, obs) ──► statistic.update ──► snapshot
//!                                               │
//!                        for each condition ◄───┘
//!                          is_active ─► edge vs previous ─► SignalEvent
//!                                               │
//!                          ExperimentStatus ◄───┘
//! ```
//!
//! Computation and persistence are separate steps: [`SequentialTest::consume`]
//! is synchronous and never touches storage, while
//! [`SequentialTest::save_checkpoint`] is an explicit async call the caller
//! schedules. A failed save leaves the in-memory runner untouched.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::future::Future;

use tracing::{debug, info, warn};

use super::{ExperimentState, ExperimentStatus, Signal, SignalEvent};
use crate::condition::Condition;
use crate::repository::StateRepository;
use crate::statistic::SequentialStatistic;
use crate::{Error, Result};

/// Boxed statistic consumed by the runner.
pub type BoxedStatistic<T, O> = Box<dyn SequentialStatistic<T, O>>;

/// Boxed condition consumed by the runner.
pub type BoxedCondition = Box<dyn Condition>;

/// Orchestrates one monitored experiment.
///
/// Exactly one `consume` call may be in flight per runner and times must be
/// non-decreasing; both are the caller's responsibility.
///
/// ```rust
/// use earlysign::condition::AlphaSpendingCondition;
/// use earlysign::experiment::{BoxedStatistic, SequentialTest, Signal};
/// use earlysign::spending::OBrienFlemingSpending;
/// use earlysign::statistic::{ProportionObservation, ProportionsZStatistic};
///
/// let statistic: BoxedStatistic<u64, ProportionObservation> = Box::new(ProportionsZStatistic::new(400));
/// let efficacy = AlphaSpendingCondition::from_spending(Box::new(OBrienFlemingSpending::new(0.05)?));
/// let mut test = SequentialTest::builder("trial-001", statistic)
///     .condition("efficacy_boundary", Box::new(efficacy))
///     .build()?;
///
/// for t in 0..200_u64 {
///     let status = test.consume(t, (t % 10 < 8, t % 10 < 3));
///     if status.is_active("efficacy_boundary") == Some(true) {
///         break;
///     }
/// }
/// assert_eq!(test.signal_history()[0].signal(), Signal::ConditionMet);
/// # Ok::<(), earlysign::Error>(())
/// ```
pub struct SequentialTest<T, O> {
    experiment_id: String,
    statistic: BoxedStatistic<T, O>,
    conditions: Vec<(String, BoxedCondition)>,
    signal_history: Vec<SignalEvent<T>>,
    previous_states: BTreeMap<String, bool>,
}

impl<T, O> SequentialTest<T, O>
where
    T: Clone + Debug,
{
    /// Create a runner from a statistic and named conditions.
    ///
    /// Conditions are evaluated in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCondition`] if two conditions share a name.
    pub fn new(
        experiment_id: impl Into<String>,
        statistic: BoxedStatistic<T, O>,
        conditions: Vec<(String, BoxedCondition)>,
    ) -> Result<Self> {
        let mut previous_states = BTreeMap::new();
        for (name, _) in &conditions {
            if previous_states.insert(name.clone(), false).is_some() {
                return Err(Error::DuplicateCondition(name.clone()));
            }
        }

        Ok(Self {
            experiment_id: experiment_id.into(),
            statistic,
            conditions,
            signal_history: Vec::new(),
            previous_states,
        })
    }

    /// Start building a runner.
    #[must_use]
    pub fn builder(
        experiment_id: impl Into<String>,
        statistic: BoxedStatistic<T, O>,
    ) -> SequentialTestBuilder<T, O> {
        SequentialTestBuilder::new(experiment_id, statistic)
    }

    /// Experiment identifier used as the checkpoint key.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// The monitored statistic.
    #[must_use]
    pub fn statistic(&self) -> &dyn SequentialStatistic<T, O> {
        self.statistic.as_ref()
    }

    /// Registered condition names, in evaluation order.
    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(name, _)| name.as_str())
    }

    /// Every signal emitted so far, oldest first.
    #[must_use]
    pub fn signal_history(&self) -> &[SignalEvent<T>] {
        &self.signal_history
    }

    /// Condition states recorded at the last look.
    #[must_use]
    pub const fn condition_states(&self) -> &BTreeMap<String, bool> {
        &self.previous_states
    }

    /// Consume one observation and report the resulting look.
    pub fn consume(&mut self, time: T, observation: O) -> ExperimentStatus<T> {
        self.statistic.update(time.clone(), observation);
        let snapshot = self.statistic.snapshot();

        let mut condition_states = BTreeMap::new();
        let mut triggered = Vec::new();

        for (name, condition) in &mut self.conditions {
            let reported = condition.is_active(&snapshot);
            let previous = self.previous_states.get(name).copied().unwrap_or(false);
            let active = reported || (previous && condition.is_absorbing());
            if active != reported {
                warn!(
                    experiment_id = %self.experiment_id,
                    condition = %name,
                    time = ?time,
                    "absorbing condition reported inactive; keeping it active"
                );
            }

            if let Some(signal) = Signal::between(previous, active) {
                info!(
                    experiment_id = %self.experiment_id,
                    condition = %name,
                    %signal,
                    time = ?time,
                    "condition state changed"
                );
                let event = SignalEvent::new(time.clone(), name.clone(), signal);
                self.signal_history.push(event.clone());
                triggered.push(event);
            }

            self.previous_states.insert(name.clone(), active);
            condition_states.insert(name.clone(), active);
        }

        let information_time = snapshot.information_time();
        debug!(
            experiment_id = %self.experiment_id,
            time = ?time,
            value = ?snapshot.value,
            information_time,
            "consumed observation"
        );

        ExperimentStatus::new(
            time,
            information_time,
            snapshot.value,
            condition_states,
            triggered,
        )
    }

    /// Assemble a checkpoint of the statistic, every condition, the signal
    /// history and the last recorded condition states.
    #[must_use]
    pub fn get_state(&self) -> ExperimentState<T> {
        ExperimentState {
            statistic_state: self.statistic.get_state(),
            conditions_state: self
                .conditions
                .iter()
                .map(|(name, condition)| (name.clone(), condition.get_state()))
                .collect(),
            signal_history: self.signal_history.clone(),
            previous_condition_states: self.previous_states.clone(),
        }
    }

    /// Restore a checkpoint. Call before any further [`consume`](Self::consume).
    ///
    /// Condition entries with no matching registered condition are skipped.
    /// Signal history and previous states are replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateMismatch`] if a component rejects its state. The
    /// runner is then rolled back to the state it had before the call.
    pub fn load_state(&mut self, state: ExperimentState<T>) -> Result<()> {
        let backup = self.get_state();
        if let Err(err) = self.apply_state(state) {
            // A runner's own checkpoint always matches its components
            if let Err(rollback) = self.apply_state(backup) {
                warn!(
                    experiment_id = %self.experiment_id,
                    error = %rollback,
                    "failed to roll back after rejected checkpoint"
                );
            }
            return Err(err);
        }
        Ok(())
    }

    fn apply_state(&mut self, state: ExperimentState<T>) -> Result<()> {
        self.statistic.load_state(state.statistic_state)?;

        for (name, condition_state) in state.conditions_state {
            match self.conditions.iter_mut().find(|(n, _)| *n == name) {
                Some((_, condition)) => condition.load_state(condition_state)?,
                None => warn!(
                    experiment_id = %self.experiment_id,
                    condition = %name,
                    "checkpoint has state for an unknown condition; ignoring"
                ),
            }
        }

        self.signal_history = state.signal_history;
        self.previous_states = state.previous_condition_states;
        Ok(())
    }

    /// Persist the current state under this runner's experiment id.
    ///
    /// The checkpoint is taken when this method is called; the returned
    /// future only performs the write.
    ///
    /// # Errors
    ///
    /// Propagates the repository's error. In-memory state is unaffected.
    pub fn save_checkpoint<'r, R>(
        &self,
        repository: &'r R,
    ) -> impl Future<Output = Result<()>> + Send + 'r
    where
        R: StateRepository<T>,
        T: Send + 'r,
    {
        let experiment_id = self.experiment_id.clone();
        let state = self.get_state();
        async move {
            let observations = state.observations();
            repository.save(&experiment_id, state).await?;
            debug!(%experiment_id, observations, "checkpoint saved");
            Ok(())
        }
    }

    /// Build a runner and warm-start it from `repository` if a checkpoint
    /// exists for `experiment_id`; otherwise start cold.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate condition names, repository failures or
    /// a checkpoint that does not fit the supplied components.
    pub async fn resume_from<R>(
        experiment_id: impl Into<String>,
        statistic: BoxedStatistic<T, O>,
        conditions: Vec<(String, BoxedCondition)>,
        repository: &R,
    ) -> Result<Self>
    where
        R: StateRepository<T>,
    {
        let mut runner = Self::new(experiment_id, statistic, conditions)?;

        if repository.exists(&runner.experiment_id).await? {
            let state = repository.load(&runner.experiment_id).await?;
            let observations = state.observations();
            runner.load_state(state)?;
            info!(experiment_id = %runner.experiment_id, observations, "resumed from checkpoint");
        } else {
            info!(experiment_id = %runner.experiment_id, "no checkpoint found; starting fresh");
        }

        Ok(runner)
    }
}

impl<T, O> Debug for SequentialTest<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialTest")
            .field("experiment_id", &self.experiment_id)
            .field("conditions", &self.conditions)
            .field("signals", &self.signal_history.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SequentialTest`].
pub struct SequentialTestBuilder<T, O> {
    experiment_id: String,
    statistic: BoxedStatistic<T, O>,
    conditions: Vec<(String, BoxedCondition)>,
}

impl<T, O> SequentialTestBuilder<T, O>
where
    T: Clone + Debug,
{
    /// Create a builder with the required fields.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, statistic: BoxedStatistic<T, O>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            statistic,
            conditions: Vec::new(),
        }
    }

    /// Register a named condition.
    #[must_use]
    pub fn condition(mut self, name: impl Into<String>, condition: BoxedCondition) -> Self {
        self.conditions.push((name.into(), condition));
        self
    }

    /// Build the runner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCondition`] if two conditions share a name.
    pub fn build(self) -> Result<SequentialTest<T, O>> {
        SequentialTest::new(self.experiment_id, self.statistic, self.conditions)
    }
}

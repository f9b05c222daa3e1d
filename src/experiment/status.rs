//! Experiment status - immutable per-look snapshot

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SignalEvent;

/// The result of one [`consume`](super::SequentialTest::consume) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStatus<T> {
    time: T,
    information_time: f64,
    statistic_value: Option<f64>,
    condition_states: BTreeMap<String, bool>,
    triggered_signals: Vec<SignalEvent<T>>,
}

impl<T> ExperimentStatus<T> {
    pub(crate) const fn new(
        time: T,
        information_time: f64,
        statistic_value: Option<f64>,
        condition_states: BTreeMap<String, bool>,
        triggered_signals: Vec<SignalEvent<T>>,
    ) -> Self {
        Self {
            time,
            information_time,
            statistic_value,
            condition_states,
            triggered_signals,
        }
    }

    /// Time of the consumed observation.
    #[must_use]
    pub const fn time(&self) -> &T {
        &self.time
    }

    /// Fraction of planned information accrued, in `[0, 1]`.
    #[must_use]
    pub const fn information_time(&self) -> f64 {
        self.information_time
    }

    /// Statistic value after this observation.
    #[must_use]
    pub const fn statistic_value(&self) -> Option<f64> {
        self.statistic_value
    }

    /// State of every registered condition at this look.
    #[must_use]
    pub const fn condition_states(&self) -> &BTreeMap<String, bool> {
        &self.condition_states
    }

    /// State of one condition, `None` if no condition has that name.
    #[must_use]
    pub fn is_active(&self, condition_name: &str) -> Option<bool> {
        self.condition_states.get(condition_name).copied()
    }

    /// Signals emitted by this look only.
    #[must_use]
    pub fn triggered_signals(&self) -> &[SignalEvent<T>] {
        &self.triggered_signals
    }
}

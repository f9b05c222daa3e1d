//! Experiment checkpoint aggregate

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SignalEvent;
use crate::condition::ConditionState;
use crate::statistic::StatisticState;

/// Everything needed to resume a runner with identical future behavior.
///
/// Restored into a fresh runner wired with the same statistic and condition
/// types, it reproduces the same statuses and signal history for the same
/// future observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentState<T> {
    /// Statistic history and sufficient statistics
    pub statistic_state: StatisticState<T>,
    /// Private state of each condition, by name
    pub conditions_state: BTreeMap<String, ConditionState>,
    /// Every signal emitted so far
    pub signal_history: Vec<SignalEvent<T>>,
    /// Condition states recorded at the last look
    pub previous_condition_states: BTreeMap<String, bool>,
}

impl<T> ExperimentState<T> {
    /// Number of observations the statistic has consumed.
    #[must_use]
    pub fn observations(&self) -> usize {
        self.statistic_state.history.len()
    }
}

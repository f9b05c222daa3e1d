//! Online test statistics
//!
//! A [`SequentialStatistic`] consumes one `(time, observation)` pair per call
//! and keeps an append-only history of `(time, value)` pairs together with
//! the amount of statistical information accrued so far.
//!
//! ## Shipped statistics
//!
//! | Statistic | Observation | Value |
//! |-----------|-------------|-------|
//! | [`ProportionsZStatistic`] | `(bool, bool)` success pair | pooled two-proportion Z |
//! | [`MeansTStatistic`] | `(f64, f64)` outcome pair | Welch t (Welford moments) |
//!
//! Both report the total sample size `n1 + n2` as their information metric
//! and checkpoint their full sufficient statistics, so a resumed statistic
//! never needs the raw observations again.

mod means;
mod proportions;

pub use means::{MeanObservation, MeansTStatistic, RunningMoments};
pub use proportions::{ProportionObservation, ProportionsZStatistic};

use serde::{Deserialize, Serialize};

use crate::Result;

/// A streaming estimator fed once per interim observation.
///
/// `T` is the caller's time type, `O` the observation type.
pub trait SequentialStatistic<T, O>: Send {
    /// Fold one observation into the statistic and append exactly one
    /// `(time, value)` entry to the history.
    fn update(&mut self, time: T, observation: O);

    /// All `(time, value)` pairs, oldest first.
    fn history(&self) -> &[(T, f64)];

    /// Latest value, `None` before the first update.
    fn current_value(&self) -> Option<f64> {
        self.history().last().map(|&(_, value)| value)
    }

    /// Information accrued so far (e.g. total sample size).
    fn current_info_metric(&self) -> f64;

    /// Information planned at the final analysis.
    fn max_info_metric(&self) -> f64;

    /// Fraction of planned information accrued, clamped to `[0, 1]`.
    fn information_time(&self) -> f64 {
        information_time(self.current_info_metric(), self.max_info_metric())
    }

    /// Read-only view handed to conditions.
    fn snapshot(&self) -> StatisticSnapshot {
        StatisticSnapshot {
            value: self.current_value(),
            info_metric: self.current_info_metric(),
            max_info_metric: self.max_info_metric(),
        }
    }

    /// Checkpoint the full internal state.
    fn get_state(&self) -> StatisticState<T>;

    /// Restore a state produced by [`get_state`](Self::get_state).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateMismatch`] if the state belongs to a
    /// different statistic.
    fn load_state(&mut self, state: StatisticState<T>) -> Result<()>;
}

/// `clamp(current / max, 0, 1)`, defined as 0 when `max <= 0`.
#[must_use]
pub fn information_time(current: f64, max: f64) -> f64 {
    if max > 0.0 {
        (current / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// What a condition may observe about a statistic at one look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticSnapshot {
    /// Latest statistic value
    pub value: Option<f64>,
    /// Information accrued so far
    pub info_metric: f64,
    /// Planned maximum information
    pub max_info_metric: f64,
}

impl StatisticSnapshot {
    /// Information time of this snapshot.
    #[must_use]
    pub fn information_time(&self) -> f64 {
        information_time(self.info_metric, self.max_info_metric)
    }
}

/// Serializable checkpoint of a statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticState<T> {
    /// `(time, value)` history
    pub history: Vec<(T, f64)>,
    /// Implementation-specific sufficient statistics
    pub internals: StatisticInternals,
}

impl<T> StatisticState<T> {
    /// State of a statistic that keeps nothing beyond its history.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            history: Vec::new(),
            internals: StatisticInternals::Empty,
        }
    }
}

impl<T> Default for StatisticState<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Sufficient statistics of the shipped statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatisticInternals {
    /// No internal state
    Empty,
    /// Two-proportion counts
    Proportions {
        /// Arm 1 sample size
        n1: u64,
        /// Arm 2 sample size
        n2: u64,
        /// Arm 1 successes
        s1: u64,
        /// Arm 2 successes
        s2: u64,
    },
    /// Per-arm Welford moments
    Means {
        /// Arm 1 moments
        arm1: RunningMoments,
        /// Arm 2 moments
        arm2: RunningMoments,
    },
}

impl StatisticInternals {
    /// Variant name, used in mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Proportions { .. } => "proportions",
            Self::Means { .. } => "means",
        }
    }
}

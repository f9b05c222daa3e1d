//! Welch two-sample t-statistic with Welford running moments
//!
//! Welford's single-pass update keeps the mean and the sum of squared
//! deviations (`M2`) without the catastrophic cancellation of the naive
//! `Σx² − (Σx)²/n` accumulation.
//!
//! References:
//! - Welford (1962): Note on a method for calculating corrected sums of
//!   squares and products

use serde::{Deserialize, Serialize};

use super::{SequentialStatistic, StatisticInternals, StatisticState};
use crate::{Error, Result};

/// `(arm 1 outcome, arm 2 outcome)` for one paired enrolment.
pub type MeanObservation = (f64, f64);

/// Running count, mean and `M2` of one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    /// Restore moments from their sufficient statistics.
    #[must_use]
    pub const fn from_parts(count: u64, mean: f64, m2: f64) -> Self {
        Self { count, mean, m2 }
    }

    /// Fold in one observation.
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Number of observations.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Running mean (0 when empty).
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean.
    #[must_use]
    pub const fn m2(&self) -> f64 {
        self.m2
    }

    /// Unbiased sample variance, `None` with fewer than two observations.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }
}

/// Welch two-sample t-statistic for a difference in means.
///
/// Reports 0 until each arm has at least two observations, and whenever the
/// standard error is zero (e.g. both arms constant).
#[derive(Debug, Clone, PartialEq)]
pub struct MeansTStatistic<T = u64> {
    max_total_samples: u64,
    history: Vec<(T, f64)>,
    arm1: RunningMoments,
    arm2: RunningMoments,
}

impl<T> MeansTStatistic<T> {
    /// Create a statistic planned for `max_total_samples` subjects across both arms.
    #[must_use]
    pub const fn new(max_total_samples: u64) -> Self {
        Self {
            max_total_samples,
            history: Vec::new(),
            arm1: RunningMoments::from_parts(0, 0.0, 0.0),
            arm2: RunningMoments::from_parts(0, 0.0, 0.0),
        }
    }

    /// Moments of arm 1.
    #[must_use]
    pub const fn arm1(&self) -> &RunningMoments {
        &self.arm1
    }

    /// Moments of arm 2.
    #[must_use]
    pub const fn arm2(&self) -> &RunningMoments {
        &self.arm2
    }

    #[allow(clippy::cast_precision_loss)]
    fn t_value(&self) -> f64 {
        let (Some(var1), Some(var2)) = (self.arm1.sample_variance(), self.arm2.sample_variance())
        else {
            return 0.0;
        };

        let std_err = (var1 / self.arm1.count as f64 + var2 / self.arm2.count as f64).sqrt();
        if std_err > 0.0 {
            (self.arm1.mean - self.arm2.mean) / std_err
        } else {
            0.0
        }
    }
}

impl<T: Clone + Send> SequentialStatistic<T, MeanObservation> for MeansTStatistic<T> {
    fn update(&mut self, time: T, (x1, x2): MeanObservation) {
        self.arm1.push(x1);
        self.arm2.push(x2);

        let t = self.t_value();
        self.history.push((time, t));
    }

    fn history(&self) -> &[(T, f64)] {
        &self.history
    }

    #[allow(clippy::cast_precision_loss)]
    fn current_info_metric(&self) -> f64 {
        (self.arm1.count + self.arm2.count) as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_info_metric(&self) -> f64 {
        self.max_total_samples as f64
    }

    fn get_state(&self) -> StatisticState<T> {
        StatisticState {
            history: self.history.clone(),
            internals: StatisticInternals::Means {
                arm1: self.arm1,
                arm2: self.arm2,
            },
        }
    }

    fn load_state(&mut self, state: StatisticState<T>) -> Result<()> {
        match state.internals {
            StatisticInternals::Means { arm1, arm2 } => {
                self.history = state.history;
                self.arm1 = arm1;
                self.arm2 = arm2;
                Ok(())
            }
            other => Err(Error::StateMismatch {
                component: "MeansTStatistic".to_string(),
                expected: "means",
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_moments() {
        let mut m = RunningMoments::default();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            m.push(x);
        }
        assert_eq!(m.count(), 8);
        assert!((m.mean() - 5.0).abs() < 1e-12);
        assert!((m.m2() - 32.0).abs() < 1e-12);
        assert!((m.sample_variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_running_moments_large_offset() {
        // Naive sum of squares loses every digit here
        let mut m = RunningMoments::default();
        for x in [1e9 + 4.0, 1e9 + 7.0, 1e9 + 13.0, 1e9 + 16.0] {
            m.push(x);
        }
        assert!((m.sample_variance().unwrap() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_requires_two_per_arm() {
        let mut t = MeansTStatistic::new(100);
        t.update(0_u64, (10.0, 1.0));
        assert_eq!(t.current_value(), Some(0.0));
        t.update(1, (12.0, 2.0));
        assert!(t.current_value().unwrap() > 0.0);
    }

    #[test]
    fn test_known_t_value() {
        let mut t = MeansTStatistic::new(100);
        let arm1 = [5.1, 4.9, 5.6, 5.8, 6.0];
        let arm2 = [4.2, 4.0, 4.8, 4.4, 3.9];
        for (i, (&a, &b)) in arm1.iter().zip(arm2.iter()).enumerate() {
            t.update(i as u64, (a, b));
        }
        let mean1 = arm1.iter().sum::<f64>() / 5.0;
        let mean2 = arm2.iter().sum::<f64>() / 5.0;
        let var1 = arm1.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / 4.0;
        let var2 = arm2.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / 4.0;
        let expected = (mean1 - mean2) / (var1 / 5.0 + var2 / 5.0).sqrt();
        assert!((t.current_value().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_is_neutral() {
        let mut t = MeansTStatistic::new(100);
        for i in 0..10_u64 {
            t.update(i, (3.0, 1.0));
        }
        assert_eq!(t.current_value(), Some(0.0));
        assert_eq!(t.current_info_metric(), 20.0);
    }

    #[test]
    fn test_state_round_trip() {
        let mut t = MeansTStatistic::new(50);
        for i in 0..6_u64 {
            t.update(i, (i as f64 * 0.5, (i as f64).sin()));
        }
        let mut restored = MeansTStatistic::new(50);
        restored.load_state(t.get_state()).unwrap();
        assert_eq!(restored, t);
    }

    #[test]
    fn test_load_rejects_proportions_state() {
        let mut t: MeansTStatistic = MeansTStatistic::new(50);
        let state = StatisticState {
            history: vec![],
            internals: StatisticInternals::Proportions {
                n1: 1,
                n2: 1,
                s1: 0,
                s2: 1,
            },
        };
        assert!(matches!(
            t.load_state(state),
            Err(Error::StateMismatch {
                expected: "means",
                found: "proportions",
                ..
            })
        ));
    }
}

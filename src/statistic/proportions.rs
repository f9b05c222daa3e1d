//! Two-sample proportion Z-statistic (normal approximation)

use super::{SequentialStatistic, StatisticInternals, StatisticState};
use crate::{Error, Result};

/// `(arm 1 success, arm 2 success)` for one paired enrolment.
pub type ProportionObservation = (bool, bool);

/// Pooled two-proportion Z-statistic.
///
/// Every update enrols one subject in each arm, so `n1 == n2` at all times.
/// When the pooled proportion is 0 or 1 the statistic is reported as 0
/// instead of dividing by a zero standard error, which keeps sparse or
/// extreme interim data from aborting the monitoring stream.
///
/// ```rust
/// use earlysign::statistic::{ProportionsZStatistic, SequentialStatistic};
///
/// let mut z = ProportionsZStatistic::new(200);
/// z.update(1_u64, (true, false));
/// z.update(2, (true, true));
/// assert_eq!(z.current_info_metric(), 4.0);
/// assert!(z.current_value().unwrap() > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionsZStatistic<T = u64> {
    max_total_samples: u64,
    history: Vec<(T, f64)>,
    n1: u64,
    n2: u64,
    s1: u64,
    s2: u64,
}

impl<T> ProportionsZStatistic<T> {
    /// Create a statistic planned for `max_total_samples` subjects across both arms.
    #[must_use]
    pub const fn new(max_total_samples: u64) -> Self {
        Self {
            max_total_samples,
            history: Vec::new(),
            n1: 0,
            n2: 0,
            s1: 0,
            s2: 0,
        }
    }

    /// `(n1, n2)` sample sizes.
    #[must_use]
    pub const fn sample_sizes(&self) -> (u64, u64) {
        (self.n1, self.n2)
    }

    /// `(s1, s2)` success counts.
    #[must_use]
    pub const fn successes(&self) -> (u64, u64) {
        (self.s1, self.s2)
    }

    /// Pooled success proportion, `None` before the first update.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pooled_proportion(&self) -> Option<f64> {
        let n = self.n1 + self.n2;
        (n > 0).then(|| (self.s1 + self.s2) as f64 / n as f64)
    }

    #[allow(clippy::cast_precision_loss)]
    fn z_value(&self) -> f64 {
        let (n1, n2) = (self.n1 as f64, self.n2 as f64);
        let p1_hat = self.s1 as f64 / n1;
        let p2_hat = self.s2 as f64 / n2;
        let p_hat = (self.s1 + self.s2) as f64 / (n1 + n2);

        if p_hat <= 0.0 || p_hat >= 1.0 {
            return 0.0;
        }

        let std_err = (p_hat * (1.0 - p_hat) * (1.0 / n1 + 1.0 / n2)).sqrt();
        if std_err > 0.0 {
            (p1_hat - p2_hat) / std_err
        } else {
            0.0
        }
    }
}

impl<T: Clone + Send> SequentialStatistic<T, ProportionObservation> for ProportionsZStatistic<T> {
    fn update(&mut self, time: T, (success1, success2): ProportionObservation) {
        self.n1 += 1;
        self.n2 += 1;
        self.s1 += u64::from(success1);
        self.s2 += u64::from(success2);

        let z = self.z_value();
        self.history.push((time, z));
    }

    fn history(&self) -> &[(T, f64)] {
        &self.history
    }

    #[allow(clippy::cast_precision_loss)]
    fn current_info_metric(&self) -> f64 {
        (self.n1 + self.n2) as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_info_metric(&self) -> f64 {
        self.max_total_samples as f64
    }

    fn get_state(&self) -> StatisticState<T> {
        StatisticState {
            history: self.history.clone(),
            internals: StatisticInternals::Proportions {
                n1: self.n1,
                n2: self.n2,
                s1: self.s1,
                s2: self.s2,
            },
        }
    }

    fn load_state(&mut self, state: StatisticState<T>) -> Result<()> {
        match state.internals {
            StatisticInternals::Proportions { n1, n2, s1, s2 } => {
                self.history = state.history;
                self.n1 = n1;
                self.n2 = n2;
                self.s1 = s1;
                self.s2 = s2;
                Ok(())
            }
            other => Err(Error::StateMismatch {
                component: "ProportionsZStatistic".to_string(),
                expected: "proportions",
                found: other.kind(),
            }),
        }
    }
}

//! Anytime-valid e-value threshold

use tracing::debug;

use super::{load_sticky, Condition, ConditionState};
use crate::statistic::StatisticSnapshot;
use crate::{Error, Result};

/// Active once the monitored e-value reaches `1 / alpha`.
///
/// By Ville's inequality an e-process exceeds `1/alpha` under the null with
/// probability at most `alpha`, at any stopping time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EValueThresholdCondition {
    threshold: f64,
    has_crossed: bool,
}

impl EValueThresholdCondition {
    /// Create a threshold condition for significance level `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha < 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::invalid("alpha", alpha, "must be a number in (0, 1)"));
        }
        Ok(Self {
            threshold: 1.0 / alpha,
            has_crossed: false,
        })
    }

    /// Evidence threshold `1 / alpha`.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether the threshold has ever been reached.
    #[must_use]
    pub const fn has_crossed(&self) -> bool {
        self.has_crossed
    }
}

impl Condition for EValueThresholdCondition {
    fn is_active(&mut self, statistic: &StatisticSnapshot) -> bool {
        if self.has_crossed {
            return true;
        }
        match statistic.value {
            Some(e_value) if e_value >= self.threshold => {
                debug!(e_value, threshold = self.threshold, "e-value threshold reached");
                self.has_crossed = true;
                true
            }
            _ => false,
        }
    }

    fn is_absorbing(&self) -> bool {
        true
    }

    fn get_state(&self) -> ConditionState {
        ConditionState::Sticky {
            has_crossed: self.has_crossed,
        }
    }

    fn load_state(&mut self, state: ConditionState) -> Result<()> {
        self.has_crossed = load_sticky("EValueThresholdCondition", state)?;
        Ok(())
    }
}

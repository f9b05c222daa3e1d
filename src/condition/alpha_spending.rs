//! Group sequential efficacy boundary driven by an alpha-spending function

use tracing::debug;

use super::{load_sticky, Condition, ConditionState};
use crate::normal;
use crate::spending::SpendingFunction;
use crate::statistic::StatisticSnapshot;
use crate::{Error, Result};

/// Two-sided alpha-spending boundary.
///
/// At information time `t` the boundary is `Φ⁻¹(1 − α(t)/2)` where
/// `α(t) = total_alpha · spent_fraction(t)`. The condition becomes active
/// when `|value| >= boundary` and stays active afterwards.
///
/// ```rust
/// use earlysign::condition::{AlphaSpendingCondition, Condition};
/// use earlysign::spending::OBrienFlemingSpending;
/// use earlysign::statistic::StatisticSnapshot;
///
/// let spending = OBrienFlemingSpending::new(0.05).unwrap();
/// let mut efficacy = AlphaSpendingCondition::from_spending(Box::new(spending));
///
/// let look = StatisticSnapshot { value: Some(3.5), info_metric: 100.0, max_info_metric: 200.0 };
/// assert!(efficacy.is_active(&look));
/// ```
#[derive(Debug)]
pub struct AlphaSpendingCondition {
    total_alpha: f64,
    spending: Box<dyn SpendingFunction>,
    has_crossed: bool,
}

impl AlphaSpendingCondition {
    /// Create a boundary spending `total_alpha` along the shape of `spending`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < total_alpha <= 1`.
    pub fn new(total_alpha: f64, spending: Box<dyn SpendingFunction>) -> Result<Self> {
        if !(total_alpha > 0.0 && total_alpha <= 1.0) {
            return Err(Error::invalid(
                "total_alpha",
                total_alpha,
                "must be a number in (0, 1]",
            ));
        }
        Ok(Self {
            total_alpha,
            spending,
            has_crossed: false,
        })
    }

    /// Create a boundary whose total budget is the spending function's own alpha.
    #[must_use]
    pub fn from_spending(spending: Box<dyn SpendingFunction>) -> Self {
        Self {
            total_alpha: spending.alpha(),
            spending,
            has_crossed: false,
        }
    }

    /// Total type-I error budget.
    #[must_use]
    pub const fn total_alpha(&self) -> f64 {
        self.total_alpha
    }

    /// Whether the boundary has ever been crossed.
    #[must_use]
    pub const fn has_crossed(&self) -> bool {
        self.has_crossed
    }

    /// Alpha spent by information time `t`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInformationTime`] if `t` is outside `[0, 1]`.
    pub fn cumulative_alpha(&self, t: f64) -> Result<f64> {
        Ok(self.total_alpha * self.spending.spent_fraction(t)?)
    }

    /// Critical |value| at information time `t`, `None` while nothing is spent.
    #[must_use]
    pub fn boundary(&self, t: f64) -> Option<f64> {
        if t <= 0.0 {
            return None;
        }
        let cumulative_alpha = self.cumulative_alpha(t).ok()?;
        if cumulative_alpha <= 0.0 {
            return None;
        }
        normal::two_sided_critical(cumulative_alpha)
    }
}

impl Condition for AlphaSpendingCondition {
    fn is_active(&mut self, statistic: &StatisticSnapshot) -> bool {
        if self.has_crossed {
            return true;
        }

        let Some(value) = statistic.value.filter(|v| !v.is_nan()) else {
            return false;
        };
        let info_time = statistic.information_time();
        let Some(boundary) = self.boundary(info_time) else {
            return false;
        };

        if value.abs() >= boundary {
            debug!(value, boundary, info_time, spending = self.spending.name(), "alpha-spending boundary crossed");
            self.has_crossed = true;
            return true;
        }
        false
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
        self.has_crossed = load_sticky("AlphaSpendingCondition", state)?;
        Ok(())
    }
}

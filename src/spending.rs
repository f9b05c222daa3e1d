//! Alpha-spending functions
//!
//! An alpha-spending function maps information time `t ∈ [0, 1]` to the
//! cumulative type-I error budget that may be spent by that look. Every
//! family here satisfies `cumulative(0) = 0`, `cumulative(1) = alpha` and is
//! non-decreasing in `t`.
//!
//! | Family | `cumulative(t)` |
//! |--------|-----------------|
//! | O'Brien-Fleming | `2·(1 − Φ(z_{1−α/2} / √t))` |
//! | Hwang-Shih-DeCani(γ) | `α·(1 − e^{−γt}) / (1 − e^{−γ})`, `α·t` at γ = 0 |
//! | Kim-DeMets(ρ) | `α·t^ρ` |
//! | Lan-DeMets Pocock | `α·ln(1 + (e − 1)·t)` |
//!
//! References:
//! - Lan & DeMets (1983): Discrete sequential boundaries for clinical trials
//! - Hwang, Shih & DeCani (1990): Group sequential designs using a family of
//!   type I error probability spending functions
//! - Kim & DeMets (1987): Design and analysis of group sequential tests based
//!   on the type I error spending rate function

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::{normal, Error, Result};

/// Common contract of every spending family.
///
/// Implementors only provide [`alpha`](Self::alpha) and the unchecked
/// [`raw_cumulative`](Self::raw_cumulative); validation of `t` and clipping
/// of the output into `[0, alpha]` happen in the provided methods.
pub trait SpendingFunction: Debug + Send + Sync {
    /// Total type-I error budget.
    fn alpha(&self) -> f64;

    /// Short family name, used in design descriptions and logs.
    fn name(&self) -> &'static str;

    /// Unchecked cumulative spending at an already validated `t`.
    fn raw_cumulative(&self, t: f64) -> f64;

    /// Cumulative alpha spent by information time `t`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInformationTime`] if `t` is NaN or outside `[0, 1]`.
    fn cumulative(&self, t: f64) -> Result<f64> {
        let t = check_information_time(t)?;
        // `max` before `min` so that a NaN from a degenerate parameter maps to 0
        Ok(self.raw_cumulative(t).max(0.0).min(self.alpha()))
    }

    /// Alpha spent in the interval `(t_prev, t]`.
    ///
    /// # Errors
    ///
    /// Returns an error if either time is invalid or `t < t_prev`.
    fn incremental(&self, t_prev: f64, t: f64) -> Result<f64> {
        let t_prev = check_information_time(t_prev)?;
        let t = check_information_time(t)?;
        if t < t_prev {
            return Err(Error::DecreasingInterval { t_prev, t });
        }
        Ok(self.cumulative(t)? - self.cumulative(t_prev)?)
    }

    /// Fraction of the total budget spent by `t`, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInformationTime`] if `t` is invalid.
    fn spent_fraction(&self, t: f64) -> Result<f64> {
        Ok(self.cumulative(t)? / self.alpha())
    }
}

/// Validate an information time.
///
/// # Errors
///
/// Returns [`Error::InvalidInformationTime`] if `t` is NaN or outside `[0, 1]`.
pub fn check_information_time(t: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&t) {
        Ok(t)
    } else {
        Err(Error::InvalidInformationTime(t))
    }
}

fn check_alpha(alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(Error::invalid("alpha", alpha, "must be a number in (0, 1]"))
    }
}

/// O'Brien-Fleming type spending (Lan-DeMets approximation).
///
/// Spends almost nothing early and most of the budget near `t = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OBrienFlemingSpending {
    alpha: f64,
    z: f64,
}

impl OBrienFlemingSpending {
    /// Create an O'Brien-Fleming spending function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha <= 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        let alpha = check_alpha(alpha)?;
        let z = normal::two_sided_critical(alpha)
            .ok_or(Error::invalid("alpha", alpha, "has no normal quantile"))?;
        Ok(Self { alpha, z })
    }
}

impl SpendingFunction for OBrienFlemingSpending {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn name(&self) -> &'static str {
        "O'Brien-Fleming"
    }

    fn raw_cumulative(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        // Φ(Φ⁻¹(p)) only round-trips to ~1e-9; the exact endpoint is alpha
        if t >= 1.0 {
            return self.alpha;
        }
        2.0 * (1.0 - normal::cdf(self.z / t.sqrt()))
    }
}

/// Hwang-Shih-DeCani spending family with shape parameter `gamma`.
///
/// `gamma < 0` is conservative early (O'Brien-Fleming like), `gamma = 0` is
/// linear spending and `gamma > 0` spends aggressively early.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HwangShihDeCaniSpending {
    alpha: f64,
    gamma: f64,
}

impl HwangShihDeCaniSpending {
    /// Create a Hwang-Shih-DeCani spending function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha <= 1` and `gamma` is finite.
    pub fn new(alpha: f64, gamma: f64) -> Result<Self> {
        let alpha = check_alpha(alpha)?;
        if !gamma.is_finite() {
            return Err(Error::invalid("gamma", gamma, "must be a finite number"));
        }
        Ok(Self { alpha, gamma })
    }

    /// Linear spending, the `gamma = 0` member of the family.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha <= 1`.
    pub fn linear(alpha: f64) -> Result<Self> {
        Self::new(alpha, 0.0)
    }

    /// Shape parameter.
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl SpendingFunction for HwangShihDeCaniSpending {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn name(&self) -> &'static str {
        "Hwang-Shih-DeCani"
    }

    fn raw_cumulative(&self, t: f64) -> f64 {
        let g = self.gamma;
        // Limit of the 0/0 form as gamma -> 0
        if g == 0.0 {
            return self.alpha * t;
        }
        // expm1 keeps precision for |gamma| near zero
        if g > 0.0 {
            self.alpha * (-g * t).exp_m1() / (-g).exp_m1()
        } else {
            // Same ratio scaled by e^{gamma}, so neither exponent can overflow
            self.alpha * (-g * (t - 1.0)).exp() * (g * t).exp_m1() / g.exp_m1()
        }
    }
}

/// Kim-DeMets power family `alpha * t^rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KimDeMetsSpending {
    alpha: f64,
    rho: f64,
}

impl KimDeMetsSpending {
    /// Create a Kim-DeMets spending function.
    ///
    /// Positivity of `rho` is not enforced. With `rho <= 0` the whole budget
    /// is spent at the first look after `t = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha <= 1` and `rho` is finite.
    pub fn new(alpha: f64, rho: f64) -> Result<Self> {
        let alpha = check_alpha(alpha)?;
        if !rho.is_finite() {
            return Err(Error::invalid("rho", rho, "must be a finite number"));
        }
        Ok(Self { alpha, rho })
    }

    /// Power parameter.
    #[must_use]
    pub const fn rho(&self) -> f64 {
        self.rho
    }
}

impl SpendingFunction for KimDeMetsSpending {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn name(&self) -> &'static str {
        "Kim-DeMets"
    }

    fn raw_cumulative(&self, t: f64) -> f64 {
        // 0^rho is 1 or infinite for rho <= 0
        if t <= 0.0 {
            return 0.0;
        }
        self.alpha * t.powf(self.rho)
    }
}

/// Lan-DeMets Pocock type spending `alpha * ln(1 + (e - 1) t)`.
///
/// Approximates constant nominal boundaries across looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PocockSpending {
    alpha: f64,
}

impl PocockSpending {
    /// Create a Pocock type spending function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha <= 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        Ok(Self {
            alpha: check_alpha(alpha)?,
        })
    }
}

impl SpendingFunction for PocockSpending {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn name(&self) -> &'static str {
        "Pocock"
    }

    fn raw_cumulative(&self, t: f64) -> f64 {
        self.alpha * (std::f64::consts::E - 1.0).mul_add(t, 1.0).ln()
    }
}

/// Serializable choice of spending family, without the alpha budget.
///
/// Designs store one of these and build the concrete function once alpha is
/// known, so presets never duplicate the spending math.
///
/// ```rust
/// use earlysign::spending::{SpendingConfig, SpendingFunction};
///
/// let config: SpendingConfig =
///     serde_json::from_str(r#"{"family": "hwang_shih_decani", "gamma": -4.0}"#).unwrap();
/// let spending = config.build(0.05).unwrap();
/// assert!((spending.cumulative(1.0).unwrap() - 0.05).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "family")]
pub enum SpendingConfig {
    /// O'Brien-Fleming type
    #[default]
    #[serde(rename = "obrien_fleming")]
    OBrienFleming,
    /// Hwang-Shih-DeCani with shape `gamma`
    #[serde(rename = "hwang_shih_decani")]
    HwangShihDeCani {
        /// Shape parameter
        #[serde(default)]
        gamma: f64,
    },
    /// Kim-DeMets power family
    #[serde(rename = "kim_demets")]
    KimDeMets {
        /// Power parameter
        #[serde(default = "default_rho")]
        rho: f64,
    },
    /// Lan-DeMets Pocock type
    #[serde(rename = "pocock")]
    Pocock,
}

const fn default_rho() -> f64 {
    1.0
}

impl SpendingConfig {
    /// Family name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OBrienFleming => "O'Brien-Fleming",
            Self::HwangShihDeCani { .. } => "Hwang-Shih-DeCani",
            Self::KimDeMets { .. } => "Kim-DeMets",
            Self::Pocock => "Pocock",
        }
    }

    /// Build the spending function for a total budget `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `alpha` or a family parameter is invalid.
    pub fn build(&self, alpha: f64) -> Result<Box<dyn SpendingFunction>> {
        Ok(match *self {
            Self::OBrienFleming => Box::new(OBrienFlemingSpending::new(alpha)?),
            Self::HwangShihDeCani { gamma } => Box::new(HwangShihDeCaniSpending::new(alpha, gamma)?),
            Self::KimDeMets { rho } => Box::new(KimDeMetsSpending::new(alpha, rho)?),
            Self::Pocock => Box::new(PocockSpending::new(alpha)?),
        })
    }
}

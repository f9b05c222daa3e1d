//! Group sequential designs
//!
//! A [`GroupSequentialDesign`] is plain configuration: a sample cap, a total
//! alpha budget and a [`SpendingConfig`]. It can be loaded from JSON and
//! turned into a running [`SequentialTest`] with an `"efficacy_boundary"`
//! alpha-spending condition, warm-started from a checkpoint when one exists.
//!
//! ```rust
//! use earlysign::design::{ExperimentDesigner, OBrienFlemingDesigner};
//! use earlysign::repository::MemoryStateRepository;
//!
//! # async fn example() -> earlysign::Result<()> {
//! let design = OBrienFlemingDesigner::new(400, 0.05)?.create_design();
//! let repository = MemoryStateRepository::new();
//! let mut test = design.instantiate_proportions("trial-001", &repository).await?;
//!
//! let status = test.consume(0, (true, false));
//! assert_eq!(status.is_active("efficacy_boundary"), Some(false));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::condition::AlphaSpendingCondition;
use crate::experiment::{BoxedCondition, BoxedStatistic, SequentialTest};
use crate::repository::StateRepository;
use crate::spending::SpendingConfig;
use crate::statistic::{MeanObservation, MeansTStatistic, ProportionObservation, ProportionsZStatistic};
use crate::{Error, Result};

/// Name of the condition every design registers.
pub const EFFICACY_BOUNDARY: &str = "efficacy_boundary";

/// Produces designs.
pub trait ExperimentDesigner {
    /// Build the design.
    fn create_design(&self) -> GroupSequentialDesign;
}

/// Two-arm group sequential design with a single efficacy boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSequentialDesign {
    name: String,
    description: String,
    max_samples: u64,
    alpha: f64,
    #[serde(default)]
    spending: SpendingConfig,
}

impl GroupSequentialDesign {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn builder(name: impl Into<String>, max_samples: u64, alpha: f64) -> GroupSequentialDesignBuilder {
        GroupSequentialDesignBuilder::new(name, max_samples, alpha)
    }

    /// Design name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total samples across both arms at full information.
    #[must_use]
    pub const fn max_samples(&self) -> u64 {
        self.max_samples
    }

    /// Total type-I error budget.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Spending family of the efficacy boundary.
    #[must_use]
    pub const fn spending(&self) -> SpendingConfig {
        self.spending
    }

    /// Check the configuration, e.g. after loading it from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero sample cap, an alpha
    /// outside `(0, 1)` or invalid spending parameters.
    pub fn validate(&self) -> Result<()> {
        if self.max_samples == 0 {
            return Err(Error::invalid("max_samples", 0.0, "must be positive"));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::invalid("alpha", self.alpha, "must be a number in (0, 1)"));
        }
        self.spending.build(self.alpha).map(drop)
    }

    fn efficacy_conditions(&self) -> Result<Vec<(String, BoxedCondition)>> {
        self.validate()?;
        let spending = self.spending.build(self.alpha)?;
        let efficacy: BoxedCondition = Box::new(AlphaSpendingCondition::new(self.alpha, spending)?);
        Ok(vec![(EFFICACY_BOUNDARY.to_string(), efficacy)])
    }

    /// Wire a two-sample proportion Z-test runner and resume it from
    /// `repository` if a checkpoint exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the design is invalid, the repository fails or the
    /// stored checkpoint does not fit a proportion test.
    pub async fn instantiate_proportions<R>(
        &self,
        experiment_id: impl Into<String>,
        repository: &R,
    ) -> Result<SequentialTest<u64, ProportionObservation>>
    where
        R: StateRepository<u64>,
    {
        let conditions = self.efficacy_conditions()?;
        let statistic: BoxedStatistic<u64, ProportionObservation> =
            Box::new(ProportionsZStatistic::new(self.max_samples));
        SequentialTest::resume_from(experiment_id, statistic, conditions, repository).await
    }

    /// Wire a Welch t-test runner and resume it from `repository` if a
    /// checkpoint exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the design is invalid, the repository fails or the
    /// stored checkpoint does not fit a means test.
    pub async fn instantiate_means<R>(
        &self,
        experiment_id: impl Into<String>,
        repository: &R,
    ) -> Result<SequentialTest<u64, MeanObservation>>
    where
        R: StateRepository<u64>,
    {
        let conditions = self.efficacy_conditions()?;
        let statistic: BoxedStatistic<u64, MeanObservation> =
            Box::new(MeansTStatistic::new(self.max_samples));
        SequentialTest::resume_from(experiment_id, statistic, conditions, repository).await
    }
}

/// Builder for [`GroupSequentialDesign`].
#[derive(Debug)]
pub struct GroupSequentialDesignBuilder {
    name: String,
    description: Option<String>,
    max_samples: u64,
    alpha: f64,
    spending: SpendingConfig,
}

impl GroupSequentialDesignBuilder {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, max_samples: u64, alpha: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            max_samples,
            alpha,
            spending: SpendingConfig::default(),
        }
    }

    /// Set the description. Defaults to one generated from the parameters.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the spending family. Defaults to O'Brien-Fleming.
    #[must_use]
    pub const fn spending(mut self, spending: SpendingConfig) -> Self {
        self.spending = spending;
        self
    }

    /// Build and validate the design.
    ///
    /// # Errors
    ///
    /// See [`GroupSequentialDesign::validate`].
    pub fn build(self) -> Result<GroupSequentialDesign> {
        let description = self.description.unwrap_or_else(|| {
            default_description(self.max_samples, self.alpha, self.spending)
        });
        let design = GroupSequentialDesign {
            name: self.name,
            description,
            max_samples: self.max_samples,
            alpha: self.alpha,
            spending: self.spending,
        };
        design.validate()?;
        Ok(design)
    }
}

fn default_description(max_samples: u64, alpha: f64, spending: SpendingConfig) -> String {
    format!(
        "Group sequential design for up to {max_samples} samples with alpha={alpha} and {} alpha spending.",
        spending.name()
    )
}

/// Designs a two-sample proportion test with an O'Brien-Fleming boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OBrienFlemingDesigner {
    max_samples: u64,
    alpha: f64,
}

impl OBrienFlemingDesigner {
    /// Name given to the produced design.
    pub const DESIGN_NAME: &'static str = "Two-Sample Proportion (O'Brien-Fleming)";

    /// Create a designer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `0 < alpha < 1` and
    /// `max_samples > 0`.
    pub fn new(max_samples: u64, alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::invalid("alpha", alpha, "must be a number in (0, 1)"));
        }
        if max_samples == 0 {
            return Err(Error::invalid("max_samples", 0.0, "must be positive"));
        }
        Ok(Self { max_samples, alpha })
    }
}

impl ExperimentDesigner for OBrienFlemingDesigner {
    fn create_design(&self) -> GroupSequentialDesign {
        GroupSequentialDesign {
            name: Self::DESIGN_NAME.to_string(),
            description: default_description(self.max_samples, self.alpha, SpendingConfig::OBrienFleming),
            max_samples: self.max_samples,
            alpha: self.alpha,
            spending: SpendingConfig::OBrienFleming,
        }
    }
}

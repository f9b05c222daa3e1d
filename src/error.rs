//! Error types for earlysign
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// earlysign error types
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration parameter is out of its valid domain
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. "alpha", "rho")
        name: &'static str,
        /// Offending value
        value: f64,
        /// Expected domain
        reason: &'static str,
    },

    /// Information time outside [0, 1] (or NaN)
    #[error("Invalid information time {0}: must be a number in [0, 1]")]
    InvalidInformationTime(f64),

    /// `incremental` called with the interval reversed
    #[error("Decreasing interval: t = {t} is before t_prev = {t_prev}\nSwap the arguments so that t_prev <= t")]
    DecreasingInterval {
        /// Start of the interval
        t_prev: f64,
        /// End of the interval
        t: f64,
    },

    /// A checkpoint was loaded into a component of a different kind
    #[error("Checkpoint mismatch for {component}: expected {expected} state, found {found}\nResume with the same statistic/condition types the checkpoint was taken from")]
    StateMismatch {
        /// Component receiving the state
        component: String,
        /// State kind the component understands
        expected: &'static str,
        /// State kind found in the checkpoint
        found: &'static str,
    },

    /// Two conditions registered under the same name
    #[error("Duplicate condition name '{0}': condition names must be unique within an experiment")]
    DuplicateCondition(String),

    /// No checkpoint stored for the experiment
    #[error("No checkpoint found for experiment '{0}'")]
    CheckpointNotFound(String),

    /// Checkpoint (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::InvalidParameter`].
    #[must_use]
    pub const fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

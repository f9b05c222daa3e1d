//! Experiment runner, signals and checkpoints
//!
//! ## Schema Overview
//!
//! ```text
//! SequentialTest (1) ──consume──► ExperimentStatus (per look)
//!        │                              └──< SignalEvent (this look)
//!        ├──< SignalEvent (append-only history)
//!        └──get_state──► ExperimentState ──► StateRepository
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use earlysign::condition::EValueThresholdCondition;
//! use earlysign::experiment::{BoxedStatistic, Reporter, Recommendation, SequentialTest};
//! use earlysign::statistic::{MeanObservation, MeansTStatistic};
//!
//! let statistic: BoxedStatistic<u64, MeanObservation> = Box::new(MeansTStatistic::new(100));
//! let mut test = SequentialTest::builder("exp-001", statistic)
//!     .condition("evidence", Box::new(EValueThresholdCondition::new(0.05)?))
//!     .build()?;
//!
//! let status = test.consume(0, (1.2, 0.9));
//! assert_eq!(status.is_active("evidence"), Some(false));
//!
//! let checkpoint = test.get_state();
//! assert_eq!(checkpoint.observations(), 1);
//! assert_eq!(
//!     Reporter::new(test.signal_history()).recommendation(),
//!     Recommendation::ContinueMonitoring
//! );
//! # Ok::<(), earlysign::Error>(())
//! ```

mod reporter;
mod runner;
mod signal;
mod state;
mod status;

pub use reporter::{Recommendation, Reporter};
pub use runner::{BoxedCondition, BoxedStatistic, SequentialTest, SequentialTestBuilder};
pub use signal::{Signal, SignalEvent};
pub use state::ExperimentState;
pub use status::ExperimentStatus;

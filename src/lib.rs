//! # earlysign: Sequential Clinical-Trial Monitoring
//!
//! **Version**: 0.1.0
//!
//! earlysign monitors a two-arm experiment one observation at a time. After
//! every observation it updates a test statistic, evaluates named stopping
//! boundaries and reports which boundaries switched on or off. Runner state
//! can be checkpointed to a repository and resumed after a restart with
//! identical future behavior.
//!
//! ## Architecture
//!
//! ```text
//! normal ──► spending ──► condition ──┐
//!                                      ├──► experiment (SequentialTest) ──► repository ──► kv
//!            statistic ───────────────┘            ▲
//!                                          design ─┘
//! ```
//!
//! - [`spending`]: O'Brien-Fleming, Hwang-Shih-DeCani, Kim-DeMets and Pocock
//!   alpha-spending functions
//! - [`statistic`]: streaming two-sample proportion Z and Welch t statistics
//! - [`condition`]: sticky alpha-spending and e-value boundaries
//! - [`experiment`]: the runner, signal events, statuses and checkpoints
//! - [`repository`]: async checkpoint storage
//! - [`design`]: group sequential designs that wire runners
//!
//! The crate reports boundary crossings; it never decides to stop a trial.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use earlysign::design::{ExperimentDesigner, OBrienFlemingDesigner};
//! use earlysign::kv::MemoryKvStore;
//! use earlysign::repository::KvStateRepository;
//!
//! # async fn example() -> earlysign::Result<()> {
//! let repository = KvStateRepository::new(MemoryKvStore::new());
//! let design = OBrienFlemingDesigner::new(1000, 0.05)?.create_design();
//!
//! // Warm-starts if a checkpoint for "trial-001" exists
//! let mut test = design.instantiate_proportions("trial-001", &repository).await?;
//!
//! for (t, pair) in [(true, false), (true, true), (false, false)].into_iter().enumerate() {
//!     let status = test.consume(t as u64, pair);
//!     for event in status.triggered_signals() {
//!         println!("{} {}", event.condition_name(), event.signal());
//!     }
//! }
//!
//! test.save_checkpoint(&repository).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod condition;
pub mod design;
pub mod error;
pub mod experiment;
pub mod kv;
pub mod normal;
pub mod repository;
pub mod spending;
pub mod statistic;

pub use error::{Error, Result};

//! Boundary conditions evaluated at every interim look
//!
//! A [`Condition`] turns the current [`StatisticSnapshot`] into an
//! active/inactive flag. The runner watches these flags and records every
//! edge as a signal event.
//!
//! Both shipped conditions are *absorbing*: once a boundary has been crossed
//! the condition stays active for the rest of the trial, and the crossing is
//! part of the checkpoint so it survives a restart. Recomputing from the
//! statistic alone would lose an early excursion that later regressed.

mod alpha_spending;
mod evalue;

pub use alpha_spending::AlphaSpendingCondition;
pub use evalue::EValueThresholdCondition;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::statistic::StatisticSnapshot;
use crate::Result;

/// A boundary evaluated against a statistic.
pub trait Condition: Debug + Send {
    /// Whether the condition holds at this look.
    ///
    /// Must not mutate anything except the condition's own checkpointed state.
    fn is_active(&mut self, statistic: &StatisticSnapshot) -> bool;

    /// Whether an active result is permanent.
    ///
    /// The runner holds an absorbing condition active after its first
    /// activation, whatever later looks report.
    fn is_absorbing(&self) -> bool;

    /// Checkpoint the condition's private state.
    fn get_state(&self) -> ConditionState;

    /// Restore a state produced by [`get_state`](Self::get_state).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateMismatch`] if the state kind is not understood.
    fn load_state(&mut self, state: ConditionState) -> Result<()>;
}

/// Serializable checkpoint of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionState {
    /// Condition without private state
    #[default]
    Stateless,
    /// Absorbing condition
    Sticky {
        /// Whether the boundary has ever been crossed
        has_crossed: bool,
    },
}

impl ConditionState {
    /// Variant name, used in mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stateless => "stateless",
            Self::Sticky { .. } => "sticky",
        }
    }
}

/// Shared restore logic of the sticky conditions.
fn load_sticky(component: &str, state: ConditionState) -> Result<bool> {
    match state {
        ConditionState::Sticky { has_crossed } => Ok(has_crossed),
        ConditionState::Stateless => Err(crate::Error::StateMismatch {
            component: component.to_string(),
            expected: "sticky",
            found: state.kind(),
        }),
    }
}

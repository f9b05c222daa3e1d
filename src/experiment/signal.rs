//! Signal events - edges of condition states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Edge emitted when a condition changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// The condition switched from inactive to active.
    ConditionMet,
    /// The condition switched from active to inactive.
    ConditionEnded,
}

impl Signal {
    /// Signal name as written in checkpoints and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConditionMet => "CONDITION_MET",
            Self::ConditionEnded => "CONDITION_ENDED",
        }
    }

    /// Edge between two consecutive condition states, if any.
    #[must_use]
    pub const fn between(previous: bool, current: bool) -> Option<Self> {
        match (previous, current) {
            (false, true) => Some(Self::ConditionMet),
            (true, false) => Some(Self::ConditionEnded),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which condition emitted which signal at what time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent<T> {
    time: T,
    condition_name: String,
    signal: Signal,
}

impl<T> SignalEvent<T> {
    /// Create a signal event.
    #[must_use]
    pub fn new(time: T, condition_name: impl Into<String>, signal: Signal) -> Self {
        Self {
            time,
            condition_name: condition_name.into(),
            signal,
        }
    }

    /// Time of the observation that caused the edge.
    #[must_use]
    pub const fn time(&self) -> &T {
        &self.time
    }

    /// Name the condition was registered under.
    #[must_use]
    pub fn condition_name(&self) -> &str {
        &self.condition_name
    }

    /// Edge direction.
    #[must_use]
    pub const fn signal(&self) -> Signal {
        self.signal
    }
}

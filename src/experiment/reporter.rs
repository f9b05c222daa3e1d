//! Reporter - human-readable summaries of a signal history

use std::fmt::{Display, Write as _};

use serde::{Deserialize, Serialize};

use super::{Signal, SignalEvent};

/// Advisory recommendation for a data monitoring committee.
///
/// The runner never stops a trial itself; this is a reading aid only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// No boundary has been met.
    ContinueMonitoring,
    /// At least one boundary has been met.
    ConsiderStopping,
}

impl Recommendation {
    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ContinueMonitoring => "Continue monitoring as planned",
            Self::ConsiderStopping => "Consider stopping the trial",
        }
    }
}

/// Summarises a signal history.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a, T> {
    history: &'a [SignalEvent<T>],
}

impl<'a, T> Reporter<'a, T> {
    /// Create a reporter over `history`.
    #[must_use]
    pub const fn new(history: &'a [SignalEvent<T>]) -> Self {
        Self { history }
    }

    /// `ConsiderStopping` iff any condition has ever been met.
    #[must_use]
    pub fn recommendation(&self) -> Recommendation {
        if self
            .history
            .iter()
            .any(|event| event.signal() == Signal::ConditionMet)
        {
            Recommendation::ConsiderStopping
        } else {
            Recommendation::ContinueMonitoring
        }
    }
}

impl<T: Display> Reporter<'_, T> {
    /// Multi-line text summary, one line per event.
    #[must_use]
    pub fn generate_summary(&self) -> String {
        let mut summary = String::from("--- Monitoring Summary ---\n");
        if self.history.is_empty() {
            summary.push_str("No signal events were recorded.");
            return summary;
        }

        let _ = writeln!(summary, "Total Signal Events: {}", self.history.len());
        for event in self.history {
            let _ = writeln!(
                summary,
                "  - Time: {}, Condition: '{}', Signal: {}",
                event.time(),
                event.condition_name(),
                event.signal()
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let history: Vec<SignalEvent<u64>> = vec![];
        let reporter = Reporter::new(&history);
        assert!(reporter.generate_summary().contains("No signal events"));
        assert_eq!(reporter.recommendation(), Recommendation::ContinueMonitoring);
    }

    #[test]
    fn test_summary_lists_events() {
        let history = vec![
            SignalEvent::new(1_u64, "c1", Signal::ConditionMet),
            SignalEvent::new(5_u64, "c1", Signal::ConditionEnded),
        ];
        let reporter = Reporter::new(&history);
        let summary = reporter.generate_summary();
        assert!(summary.contains("Total Signal Events: 2"));
        assert!(summary.contains("Time: 1, Condition: 'c1', Signal: CONDITION_MET"));
        assert!(summary.contains("Time: 5, Condition: 'c1', Signal: CONDITION_ENDED"));
        assert_eq!(reporter.recommendation(), Recommendation::ConsiderStopping);
    }

    #[test]
    fn test_only_ended_signals_do_not_recommend_stopping() {
        let history = vec![SignalEvent::new(3_u64, "c", Signal::ConditionEnded)];
        assert_eq!(
            Reporter::new(&history).recommendation(),
            Recommendation::ContinueMonitoring
        );
        assert_eq!(
            Recommendation::ConsiderStopping.description(),
            "Consider stopping the trial"
        );
    }
}

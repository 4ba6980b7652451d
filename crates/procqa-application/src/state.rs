//! Send lifecycle state machine.
//!
//! Each send moves through named states; transitions are enforced by
//! [`SendTracker`] so the lifecycle is testable independent of any
//! rendering layer.

use procqa_core::{ProcqaError, Result};

/// Phase of a single send operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    /// No send in progress.
    Idle,
    /// Input accepted, not yet applied.
    Composing,
    /// The user message has been applied to the local transcript.
    OptimisticApplied,
    /// The round-trip is in flight.
    AwaitingServer,
    /// Server state has replaced or extended local state.
    Reconciled,
    /// The round-trip failed; the transcript carries an error annotation.
    Failed,
}

impl SendPhase {
    /// Legal transition table.
    pub fn can_transition_to(self, next: SendPhase) -> bool {
        use SendPhase::*;
        matches!(
            (self, next),
            (Idle, Composing)
                | (Composing, OptimisticApplied)
                | (OptimisticApplied, AwaitingServer)
                | (AwaitingServer, Reconciled)
                | (AwaitingServer, Failed)
                | (Reconciled, Idle)
                | (Failed, Idle)
        )
    }

    /// True for the states in which the send has run to completion.
    pub fn is_terminal(self) -> bool {
        matches!(self, SendPhase::Reconciled | SendPhase::Failed)
    }
}

/// Tracks one send through its lifecycle, refusing illegal transitions.
#[derive(Debug)]
pub struct SendTracker {
    phase: SendPhase,
}

impl SendTracker {
    pub fn new() -> Self {
        Self {
            phase: SendPhase::Idle,
        }
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    /// Moves to `next`, or errors if the transition is not in the table.
    pub fn advance(&mut self, next: SendPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(ProcqaError::internal(format!(
                "illegal send transition: {:?} -> {:?}",
                self.phase, next
            )));
        }
        self.phase = next;
        Ok(())
    }
}

impl Default for SendTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path() {
        let mut tracker = SendTracker::new();
        for phase in [
            SendPhase::Composing,
            SendPhase::OptimisticApplied,
            SendPhase::AwaitingServer,
            SendPhase::Reconciled,
            SendPhase::Idle,
        ] {
            tracker.advance(phase).unwrap();
        }
        assert_eq!(tracker.phase(), SendPhase::Idle);
    }

    #[test]
    fn test_failure_path() {
        let mut tracker = SendTracker::new();
        tracker.advance(SendPhase::Composing).unwrap();
        tracker.advance(SendPhase::OptimisticApplied).unwrap();
        tracker.advance(SendPhase::AwaitingServer).unwrap();
        tracker.advance(SendPhase::Failed).unwrap();
        assert!(tracker.phase().is_terminal());
    }

    #[test]
    fn test_illegal_transitions_refused() {
        let mut tracker = SendTracker::new();
        assert!(tracker.advance(SendPhase::Reconciled).is_err());
        assert!(tracker.advance(SendPhase::AwaitingServer).is_err());

        tracker.advance(SendPhase::Composing).unwrap();
        // No skipping the optimistic apply.
        assert!(tracker.advance(SendPhase::AwaitingServer).is_err());
        // Refused transitions leave the phase unchanged.
        assert_eq!(tracker.phase(), SendPhase::Composing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(SendPhase::Reconciled.is_terminal());
        assert!(SendPhase::Failed.is_terminal());
        assert!(!SendPhase::AwaitingServer.is_terminal());
        assert!(!SendPhase::Idle.is_terminal());
    }
}

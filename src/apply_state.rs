//! Apply State Machine
//!
//! Tracks one mutation through its single apply pass and records the outcome
//! of every statement that was submitted.
//!
//! # State Flow
//!
//! ```text
//! Pending
//!    ↓
//! Applying ──→ Failed
//!    ↓
//! Succeeded
//! ```
//!
//! Both `Succeeded` and `Failed` are terminal. There is no way back to
//! `Pending`; a failed mutation is re-run by constructing a new one.

use crate::version::Version;
use std::fmt;
use thiserror::Error;

/// Lifecycle of a mutation apply pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyState {
    /// Constructed, nothing submitted yet
    Pending,
    /// Statements are being submitted in order
    Applying,
    /// Every statement succeeded (terminal)
    Succeeded,
    /// A statement failed, the rest were never submitted (terminal)
    Failed,
}

impl ApplyState {
    /// Returns true if this is a terminal state (Succeeded or Failed)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if `target` may directly follow this state
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Applying)
                | (Self::Applying, Self::Succeeded)
                | (Self::Applying, Self::Failed)
        )
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applying => "applying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ApplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyTransitionError {
    /// Attempted to leave a terminal state
    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: ApplyState },

    /// Transition not in the state graph
    #[error("Cannot transition from {from} to {to}")]
    Invalid { from: ApplyState, to: ApplyState },

    /// Outcome recorded while not applying
    #[error("Cannot record a statement outcome while {state}")]
    NotApplying { state: ApplyState },
}

/// Result of submitting one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Succeeded { attempts: u32 },
    Failed { cause: String },
}

impl StatementOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Outcome of a statement together with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRecord {
    /// Position in the mutation's statement sequence
    pub index: usize,
    pub statement: String,
    pub outcome: StatementOutcome,
}

/// State of a single mutation apply pass.
///
/// # Example
///
/// ```
/// use mutagen_cassandra::apply_state::{ApplyState, MutationRun};
/// use mutagen_cassandra::version::Version;
///
/// let mut run = MutationRun::new(Version::new(1));
/// assert_eq!(run.state(), ApplyState::Pending);
///
/// run.begin().unwrap();
/// run.record_success(0, "SELECT 1;", 1).unwrap();
/// run.complete().unwrap();
/// assert!(run.is_succeeded());
///
/// // Terminal states are final
/// assert!(run.begin().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MutationRun {
    version: Version,
    state: ApplyState,
    records: Vec<StatementRecord>,
}

impl MutationRun {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            state: ApplyState::Pending,
            records: Vec::new(),
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn state(&self) -> ApplyState {
        self.state
    }

    #[inline]
    pub fn is_succeeded(&self) -> bool {
        self.state == ApplyState::Succeeded
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.state == ApplyState::Failed
    }

    /// Outcomes in submission order
    pub fn records(&self) -> &[StatementRecord] {
        &self.records
    }

    /// The failing statement, if the run failed
    pub fn failure(&self) -> Option<&StatementRecord> {
        self.records.iter().find(|r| !r.outcome.is_success())
    }

    /// Sum of attempts over all successful statements
    pub fn total_attempts(&self) -> u32 {
        self.records
            .iter()
            .map(|r| match r.outcome {
                StatementOutcome::Succeeded { attempts } => attempts,
                StatementOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// `Pending → Applying`
    pub fn begin(&mut self) -> Result<(), ApplyTransitionError> {
        self.transition_to(ApplyState::Applying)
    }

    /// `Applying → Succeeded`
    pub fn complete(&mut self) -> Result<(), ApplyTransitionError> {
        self.transition_to(ApplyState::Succeeded)
    }

    /// Record a successful statement; the run stays `Applying`.
    pub fn record_success(
        &mut self,
        index: usize,
        statement: &str,
        attempts: u32,
    ) -> Result<(), ApplyTransitionError> {
        self.ensure_applying()?;
        self.records.push(StatementRecord {
            index,
            statement: statement.to_string(),
            outcome: StatementOutcome::Succeeded { attempts },
        });
        Ok(())
    }

    /// Record a failed statement and move to `Failed`.
    pub fn record_failure(
        &mut self,
        index: usize,
        statement: &str,
        cause: impl Into<String>,
    ) -> Result<(), ApplyTransitionError> {
        self.ensure_applying()?;
        self.records.push(StatementRecord {
            index,
            statement: statement.to_string(),
            outcome: StatementOutcome::Failed {
                cause: cause.into(),
            },
        });
        self.transition_to(ApplyState::Failed)
    }

    fn ensure_applying(&self) -> Result<(), ApplyTransitionError> {
        if self.state == ApplyState::Applying {
            Ok(())
        } else {
            Err(ApplyTransitionError::NotApplying { state: self.state })
        }
    }

    fn transition_to(&mut self, target: ApplyState) -> Result<(), ApplyTransitionError> {
        if self.state.is_terminal() {
            return Err(ApplyTransitionError::FromTerminalState { from: self.state });
        }
        if !self.state.can_transition_to(target) {
            return Err(ApplyTransitionError::Invalid {
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_graph() {
        assert!(ApplyState::Pending.can_transition_to(ApplyState::Applying));
        assert!(ApplyState::Applying.can_transition_to(ApplyState::Failed));
        assert!(!ApplyState::Pending.can_transition_to(ApplyState::Succeeded));
        assert!(!ApplyState::Applying.can_transition_to(ApplyState::Pending));
        assert!(ApplyState::Failed.is_terminal());
        assert!(!ApplyState::Applying.is_terminal());
    }

    #[test]
    fn test_cannot_complete_without_begin() {
        let mut run = MutationRun::new(Version::new(1));
        assert_eq!(
            run.complete(),
            Err(ApplyTransitionError::Invalid {
                from: ApplyState::Pending,
                to: ApplyState::Succeeded
            })
        );
    }

    #[test]
    fn test_cannot_record_while_pending() {
        let mut run = MutationRun::new(Version::new(1));
        assert!(matches!(
            run.record_success(0, "SELECT 1;", 1),
            Err(ApplyTransitionError::NotApplying { .. })
        ));
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut run = MutationRun::new(Version::new(4));
        run.begin().unwrap();
        run.record_success(0, "a;", 2).unwrap();
        run.record_failure(1, "b;", "timeout").unwrap();

        assert!(run.is_failed());
        assert_eq!(run.failure().map(|r| r.index), Some(1));
        assert_eq!(run.total_attempts(), 2);
        assert!(matches!(
            run.record_success(2, "c;", 1),
            Err(ApplyTransitionError::NotApplying { .. })
        ));
        assert!(matches!(
            run.complete(),
            Err(ApplyTransitionError::FromTerminalState { .. })
        ));
    }
}

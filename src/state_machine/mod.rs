// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic, pure state machine types used to model component lifecycles.
//! Transitions are deterministic functions with no side effects; history is
//! recorded by [`StateMachineWithHistory`].
//!
//! This is a **Mealy** formulation: the output of a transition depends on
//! both the current state and the input.
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```

pub mod component_lifecycle;

pub use component_lifecycle::{ComponentState, LifecycleCommand};

use chrono::{DateTime, Utc};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} via {input}")]
    InvalidTransition { from: String, input: String },

    /// Precondition not met for transition
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Valid inputs from the current state
    fn valid_inputs(&self) -> Vec<Self::Input>
    where
        Self::Input: Clone,
    {
        Vec::new()
    }
}

/// Transition metadata
#[derive(Debug, Clone)]
pub struct Transition<S, I> {
    /// State before transition
    pub from: S,

    /// State after transition
    pub to: S,

    /// Input that triggered transition
    pub input: I,

    /// Timestamp of transition
    pub timestamp: DateTime<Utc>,
}

/// State machine with history
#[derive(Debug, Clone)]
pub struct StateMachineWithHistory<FSM: StateMachine> {
    current: FSM,
    history: Vec<Transition<FSM, FSM::Input>>,
}

impl<FSM: StateMachine> StateMachineWithHistory<FSM> {
    /// Start tracking from `initial`
    pub fn new(initial: FSM) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    /// Apply `input`, recording the transition on success
    ///
    /// A rejected input leaves both the state and the history untouched.
    pub fn apply(&mut self, input: FSM::Input, timestamp: DateTime<Utc>) -> TransitionResult<FSM::Output>
    where
        FSM::Input: Clone,
    {
        let (to, output) = self.current.transition(&input)?;

        self.history.push(Transition {
            from: self.current.clone(),
            to: to.clone(),
            input,
            timestamp,
        });

        self.current = to;
        Ok(output)
    }

    /// Get transition history
    pub fn history(&self) -> &[Transition<FSM, FSM::Input>] {
        &self.history
    }

    /// Get current state
    pub fn current(&self) -> &FSM {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two-phase gate: Closed -> Open, anything else is rejected
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Gate {
        Closed,
        Open,
    }

    #[derive(Debug, Clone)]
    struct Unlock;

    impl StateMachine for Gate {
        type Input = Unlock;
        type Output = ();

        fn transition(&self, _input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
            match self {
                Gate::Closed => Ok((Gate::Open, ())),
                Gate::Open => Err(TransitionError::InvalidTransition {
                    from: "Open".to_string(),
                    input: "Unlock".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_history_records_accepted_transitions() {
        let mut gate = StateMachineWithHistory::new(Gate::Closed);

        gate.apply(Unlock, Utc::now()).unwrap();
        assert_eq!(*gate.current(), Gate::Open);
        assert_eq!(gate.history().len(), 1);
        assert_eq!(gate.history()[0].from, Gate::Closed);
    }

    #[test]
    fn test_rejected_transition_leaves_state() {
        let mut gate = StateMachineWithHistory::new(Gate::Open);

        assert!(gate.apply(Unlock, Utc::now()).is_err());
        assert_eq!(*gate.current(), Gate::Open);
        assert!(gate.history().is_empty());
        assert!(!Gate::Open.can_transition(&Unlock));
    }
}

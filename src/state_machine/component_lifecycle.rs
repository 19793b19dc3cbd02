// Copyright (c) 2025 - Cowboy AI, Inc.
//! Component Lifecycle State Machine
//!
//! Construction of a component is strictly sequential:
//!
//! ```text
//! Uninitialized ─ResolveConfig─► ConfigResolved ─Validate─► Validated
//!       ─BeginPopulating─► Populating ─FinishPopulating─► Populated
//! ```
//!
//! There is no way back and no skipping; `Populated` is terminal. Outputs are
//! readable only in `Populated`.

use super::{StateMachine, TransitionError, TransitionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Construction state of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    /// Declared, nothing resolved yet
    Uninitialized,
    /// Defaults and overrides merged
    ConfigResolved,
    /// Invariants checked
    Validated,
    /// Children being created
    Populating,
    /// All children created, outputs published
    Populated,
}

impl ComponentState {
    /// Whether outputs may be read
    pub fn outputs_readable(&self) -> bool {
        matches!(self, Self::Populated)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Configuration merged over defaults
    ResolveConfig,
    /// Validator passed
    Validate,
    /// Child creation starts
    BeginPopulating,
    /// Child creation finished
    FinishPopulating,
}

impl StateMachine for ComponentState {
    type Input = LifecycleCommand;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use ComponentState::*;
        use LifecycleCommand::*;

        match (self, input) {
            (Uninitialized, ResolveConfig) => Ok((ConfigResolved, ())),
            (ConfigResolved, Validate) => Ok((Validated, ())),
            (Validated, BeginPopulating) => Ok((Populating, ())),
            (Populating, FinishPopulating) => Ok((Populated, ())),
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: format!("{input:?}"),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use ComponentState::*;
        use LifecycleCommand::*;

        match self {
            Uninitialized => vec![ResolveConfig],
            ConfigResolved => vec![Validate],
            Validated => vec![BeginPopulating],
            Populating => vec![FinishPopulating],
            Populated => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::StateMachineWithHistory;
    use chrono::Utc;

    #[test]
    fn test_full_construction_sequence() {
        let mut lifecycle = StateMachineWithHistory::new(ComponentState::Uninitialized);

        for command in [
            LifecycleCommand::ResolveConfig,
            LifecycleCommand::Validate,
            LifecycleCommand::BeginPopulating,
            LifecycleCommand::FinishPopulating,
        ] {
            lifecycle.apply(command, Utc::now()).expect("sequential transition");
        }

        assert_eq!(*lifecycle.current(), ComponentState::Populated);
        assert_eq!(lifecycle.history().len(), 4);
        assert!(lifecycle.current().outputs_readable());
    }

    #[test]
    fn test_cannot_skip_validation() {
        let result = ComponentState::ConfigResolved.transition(&LifecycleCommand::BeginPopulating);
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_populated_is_terminal() {
        assert!(ComponentState::Populated.valid_inputs().is_empty());
        assert!(!ComponentState::Populated.can_transition(&LifecycleCommand::ResolveConfig));
    }

    #[test]
    fn test_outputs_only_readable_when_populated() {
        for state in [
            ComponentState::Uninitialized,
            ComponentState::ConfigResolved,
            ComponentState::Validated,
            ComponentState::Populating,
        ] {
            assert!(!state.outputs_readable());
        }
    }

    #[test]
    fn test_each_state_has_one_valid_input() {
        for state in [
            ComponentState::Uninitialized,
            ComponentState::ConfigResolved,
            ComponentState::Validated,
            ComponentState::Populating,
        ] {
            let inputs = state.valid_inputs();
            assert_eq!(inputs.len(), 1);
            assert!(state.can_transition(&inputs[0]));
        }
    }
}

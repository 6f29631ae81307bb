//! This module provides functions for analyzing machine definitions to detect likely mistakes
//! that do not make a definition invalid, such as unreachable states or transitions that can
//! never fire.

use std::collections::BTreeSet;
use std::fmt;

use crate::definition::Definition;
use crate::types::State;

/// A non-fatal finding about a machine definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// States that cannot be reached from the initial state through any transition.
    UnreachableStates(Vec<State>),
    /// Final states that have outgoing transitions. The machine halts as soon as it enters a
    /// final state, so these transitions never fire.
    FinalStateTransitions(Vec<State>),
    /// The definition has no final states; the machine can only halt on an undefined
    /// transition or by running out of steps.
    NoFinalStates,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
            Diagnostic::FinalStateTransitions(states) => write!(
                f,
                "Transitions out of final states are never taken: {:?}",
                states
            ),
            Diagnostic::NoFinalStates => write!(f, "No final states defined"),
        }
    }
}

/// Analyzes a `Definition` and returns every diagnostic that applies, in a stable order.
///
/// The definition is expected to be valid; see [`Definition::validate`].
pub fn analyze(definition: &Definition) -> Vec<Diagnostic> {
    [
        check_final_states,
        check_unreachable_states,
        check_final_state_transitions,
    ]
    .iter()
    .filter_map(|f| f(definition))
    .collect()
}

fn check_final_states(definition: &Definition) -> Option<Diagnostic> {
    definition
        .final_states
        .is_empty()
        .then_some(Diagnostic::NoFinalStates)
}

/// Checks for unreachable states by traversing transitions from the initial state.
///
/// Traversal stops at final states, since the machine never leaves them.
fn check_unreachable_states(definition: &Definition) -> Option<Diagnostic> {
    let mut visited = BTreeSet::new();
    let mut queue = vec![definition.initial_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) || definition.final_states.contains(state) {
            continue;
        }

        for (_, transition) in definition.transition_func.from_state(state) {
            if !visited.contains(transition.next_state.as_str()) {
                queue.push(transition.next_state.as_str());
            }
        }
    }

    let unreachable: Vec<State> = definition
        .states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();

    (!unreachable.is_empty()).then_some(Diagnostic::UnreachableStates(unreachable))
}

fn check_final_state_transitions(definition: &Definition) -> Option<Diagnostic> {
    let states: Vec<State> = definition
        .final_states
        .iter()
        .filter(|state| definition.transition_func.from_state(state).next().is_some())
        .cloned()
        .collect();

    (!states.is_empty()).then_some(Diagnostic::FinalStateTransitions(states))
}

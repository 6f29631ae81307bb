//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including transitions, step outcomes, halt reasons, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// Opaque label identifying one configuration of the machine's internal control.
pub type State = String;
/// Opaque label identifying the content of one tape cell.
pub type Symbol = String;

/// The blank symbol used when a definition does not declare one.
pub const DEFAULT_BLANK_SYMBOL: &str = "_";
/// The maximum allowed size for a machine definition file in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default number of steps to execute before giving up on a run.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// The trace width used when no terminal width is available.
pub const DEFAULT_TRACE_WIDTH: usize = 80;

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Returns the change in head position caused by this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// The result of the transition function for a `(state, symbol)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written over the cell under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// The machine performed a step and may continue.
    Continue,
    /// The machine has halted and will not take further steps.
    Halt(Halt),
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The current state is one of the final states.
    Final,
    /// No transition is defined for the current state and the symbol under the head.
    Undefined,
    /// The next move would take the head past the last addressable position.
    TapeLimit,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Final => write!(f, "reached a final state"),
            Halt::Undefined => write!(f, "no transition defined"),
            Halt::TapeLimit => write!(f, "head at the edge of the addressable tape"),
        }
    }
}

/// The reasons a machine definition can be rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("alphabet is empty")]
    EmptyAlphabet,
    #[error("blank symbol '{0}' is not in the alphabet")]
    BlankNotInAlphabet(Symbol),
    #[error("initial tape symbol '{symbol}' at position {position} is not in the alphabet")]
    UnknownTapeSymbol { position: usize, symbol: Symbol },
    #[error("initial state '{0}' is not in the set of states")]
    UnknownInitialState(State),
    #[error("final states {0:?} are not in the set of states")]
    UnknownFinalStates(Vec<State>),
    #[error("transition ({state}, {read}) references unknown state '{unknown}'")]
    UnknownTransitionState {
        state: State,
        read: Symbol,
        unknown: State,
    },
    #[error("transition ({state}, {read}) references unknown symbol '{unknown}'")]
    UnknownTransitionSymbol {
        state: State,
        read: Symbol,
        unknown: Symbol,
    },
    #[error("duplicate transition for ({state}, {read})")]
    DuplicateTransition { state: State, read: Symbol },
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The machine definition violates one of the construction checks.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),
    /// Indicates an error during the parsing of a `.tm` machine definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a structural problem found while reading a definition or looking one up.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a malformed JSON machine definition.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for TuringMachineError {
    fn from(error: serde_json::Error) -> Self {
        TuringMachineError::JsonError(error.to_string())
    }
}

//! This crate provides the core logic for a deterministic single-tape Turing Machine simulator.
//! It includes modules for describing and validating machines, executing them on a sparse
//! bi-infinite tape, parsing and loading machine definitions, analyzing definitions for likely
//! mistakes, rendering execution traces, and a small catalog of built-in machines.

pub mod analyzer;
pub mod definition;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the machine description types from the definition module.
pub use definition::{Definition, Instruction, TransitionTable};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports the `TuringMachine` struct and its `Snapshot` from the machine module.
pub use machine::{Snapshot, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `MachineInfo`, `MachineManager`, and `MACHINES` from the programs module.
pub use programs::{MachineInfo, MachineManager, MACHINES};
/// Re-exports the `Tape` and its `TapeView` from the tape module.
pub use tape::{Tape, TapeView};
/// Re-exports the trace observer types from the trace module.
pub use trace::{Frame, Observer, Trace};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    DefinitionError, Direction, Halt, State, Step, Symbol, Transition, TuringMachineError,
    MAX_EXECUTION_STEPS, MAX_PROGRAM_SIZE,
};

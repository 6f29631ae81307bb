//! This module defines the `TuringMachine` struct, which simulates a deterministic single-tape
//! Turing Machine. It validates a [`Definition`], owns the tape, and executes the transition
//! function one step at a time.

use serde::{Deserialize, Serialize};
use std::io;

use crate::definition::Definition;
use crate::tape::{Tape, TapeView};
use crate::trace::{Observer, Trace};
use crate::types::{Halt, State, Step, Transition, TuringMachineError, DEFAULT_TRACE_WIDTH};

/// Represents a single-tape Turing Machine.
///
/// The definition is fixed at construction. Only the tape, the head position, the current
/// state, and the step counter change, and only through [`TuringMachine::step`].
#[derive(Debug, Clone)]
pub struct TuringMachine {
    definition: Definition,
    tape: Tape,
    head: i64,
    state: State,
    step_count: usize,
}

/// A serializable picture of a machine at one point of its execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub state: State,
    pub head: i64,
    pub steps: usize,
    pub halt: Option<Halt>,
    pub tape: TapeView,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` from a given `Definition`.
    ///
    /// The definition is validated first; if any check fails no machine is created.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` positioned at the definition's head offset and initial state.
    /// * `Err(TuringMachineError::InvalidDefinition)` describing the first failed check.
    pub fn new(definition: Definition) -> Result<Self, TuringMachineError> {
        definition.validate()?;

        log::debug!(
            "constructed machine '{}' ({} states, {} symbols, {} transitions)",
            definition.name,
            definition.states.len(),
            definition.alphabet.len(),
            definition.transition_func.len()
        );

        Ok(Self {
            tape: initial_tape(&definition),
            head: definition.head,
            state: definition.initial_state.clone(),
            definition,
            step_count: 0,
        })
    }

    /// Executes a single step of the machine's computation.
    ///
    /// The final-state check happens before anything else: a machine sitting in a final
    /// state never fires another transition. Otherwise the transition for the current state
    /// and the symbol under the head is applied: the symbol is overwritten, the state advances,
    /// and the head moves.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt(_)` with the reason if the machine is halted. Nothing is mutated. A move
    ///   that would leave the `i64` range halts with `Halt::TapeLimit` before writing.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = self.halt_reason() {
            return Step::Halt(halt);
        }

        let Some(Transition {
            next_state,
            write,
            direction,
        }) = self.transition().cloned()
        else {
            return Step::Halt(Halt::Undefined);
        };
        let Some(head) = self.head.checked_add(direction.offset()) else {
            return Step::Halt(Halt::TapeLimit);
        };

        log::trace!(
            "step {}: ({}, {}) -> ({}, {}, {}) at {}",
            self.step_count + 1,
            self.state,
            self.symbol(),
            next_state,
            write,
            direction,
            self.head
        );

        self.tape.set(self.head, write);
        self.state = next_state;
        self.head = head;
        self.step_count += 1;

        Step::Continue
    }

    /// Runs the machine for at most `max_iter` steps, stopping early if it halts.
    ///
    /// With `verbose`, every configuration is printed to stdout as a two-line trace.
    /// The returned value is `Step::Continue` if the step budget ran out first.
    pub fn run(&mut self, max_iter: usize, verbose: bool) -> Step {
        if !verbose {
            return self.run_with(max_iter, &mut ());
        }

        let mut trace = Trace::new(io::stdout().lock(), DEFAULT_TRACE_WIDTH);
        let step = self.run_with(max_iter, &mut trace);
        if let Err(e) = trace.finish() {
            log::warn!("failed to write trace: {}", e);
        }

        step
    }

    /// Runs the machine like [`TuringMachine::run`], reporting progress to `observer`.
    pub fn run_with<O>(&mut self, max_iter: usize, observer: &mut O) -> Step
    where
        O: Observer + ?Sized,
    {
        observer.on_start(self);

        for _ in 0..max_iter {
            match self.step() {
                Step::Continue => observer.on_step(self),
                Step::Halt(halt) => return self.finish(halt, observer),
            }
        }

        match self.halt_reason() {
            Some(halt) => self.finish(halt, observer),
            None => Step::Continue,
        }
    }

    fn finish<O>(&self, halt: Halt, observer: &mut O) -> Step
    where
        O: Observer + ?Sized,
    {
        log::debug!(
            "machine '{}' halted after {} steps in state {}: {}",
            self.definition.name,
            self.step_count,
            self.state,
            halt
        );
        observer.on_halt(self, halt);

        Step::Halt(halt)
    }

    /// Returns why the machine is halted, or `None` if it can still take a step.
    pub fn halt_reason(&self) -> Option<Halt> {
        if self.is_final() {
            Some(Halt::Final)
        } else {
            match self.transition() {
                None => Some(Halt::Undefined),
                Some(t) if self.head.checked_add(t.direction.offset()).is_none() => {
                    Some(Halt::TapeLimit)
                }
                Some(_) => None,
            }
        }
    }

    /// Checks if the machine is halted, for either reason.
    pub fn is_halted(&self) -> bool {
        self.halt_reason().is_some()
    }

    /// Checks if the current state is one of the final states.
    pub fn is_final(&self) -> bool {
        self.definition.final_states.contains(&self.state)
    }

    /// Returns the transition that the next step would apply, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.definition
            .transition_func
            .get(&self.state, self.symbol())
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> &str {
        self.tape.get(self.head)
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the current head position.
    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Resets the machine to its initial configuration.
    pub fn reset(&mut self) {
        self.tape = initial_tape(&self.definition);
        self.head = self.definition.head;
        self.state = self.definition.initial_state.clone();
        self.step_count = 0;
    }

    /// Captures the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.definition.name.clone(),
            state: self.state.clone(),
            head: self.head,
            steps: self.step_count,
            halt: self.halt_reason(),
            tape: self.tape.contents(),
        }
    }
}

fn initial_tape(definition: &Definition) -> Tape {
    Tape::with_contents(
        definition.blank_symbol.as_str(),
        definition.initial_tape.iter().map(String::as_str),
    )
}

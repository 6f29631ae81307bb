//! The declarative description of a machine and the checks it must pass before it can run.

use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::types::{DefinitionError, Direction, State, Symbol, Transition, DEFAULT_BLANK_SYMBOL};

/// A complete single-tape Turing Machine definition.
///
/// The field names match the recognized keys of a JSON definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Human-readable name of the machine.
    #[serde(default)]
    pub name: String,
    /// The finite set of states.
    pub states: BTreeSet<State>,
    /// The finite set of tape symbols.
    pub alphabet: BTreeSet<Symbol>,
    /// The symbol filling every cell that was never written.
    #[serde(default = "default_blank")]
    pub blank_symbol: Symbol,
    /// Symbols written from position 0 onwards before the first step.
    #[serde(default)]
    pub initial_tape: Vec<Symbol>,
    /// The state the machine starts in.
    pub initial_state: State,
    /// States that cause the machine to halt.
    #[serde(default)]
    pub final_states: BTreeSet<State>,
    /// The partial transition function.
    pub transition_func: TransitionTable,
    /// Starting head position.
    #[serde(default)]
    pub head: i64,
}

fn default_blank() -> Symbol {
    DEFAULT_BLANK_SYMBOL.to_string()
}

/// One entry of the transition function in its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub state: State,
    pub read: Symbol,
    pub write: Symbol,
    pub direction: Direction,
    pub next_state: State,
}

/// The partial mapping from `(state, symbol)` to [`Transition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Instruction>", into = "Vec<Instruction>")]
pub struct TransitionTable {
    entries: BTreeMap<State, BTreeMap<Symbol, Transition>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transition for `(state, read)`.
    ///
    /// Fails if the pair already has a transition, since the machine is deterministic.
    pub fn insert(
        &mut self,
        state: impl Into<State>,
        read: impl Into<Symbol>,
        transition: Transition,
    ) -> Result<(), DefinitionError> {
        let state = state.into();
        let reads = self.entries.entry(state.clone()).or_default();

        match reads.entry(read.into()) {
            btree_map::Entry::Occupied(entry) => Err(DefinitionError::DuplicateTransition {
                state,
                read: entry.key().clone(),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(transition);
                Ok(())
            }
        }
    }

    /// Looks up the transition for `(state, symbol)`. `None` means the machine halts.
    pub fn get(&self, state: &str, symbol: &str) -> Option<&Transition> {
        self.entries.get(state)?.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(state, read, transition)` triples, ordered by state then symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Transition)> {
        self.entries.iter().flat_map(|(state, reads)| {
            reads
                .iter()
                .map(move |(read, transition)| (state.as_str(), read.as_str(), transition))
        })
    }

    /// Iterates over the transitions leaving `state`.
    pub fn from_state<'a>(
        &'a self,
        state: &str,
    ) -> impl Iterator<Item = (&'a str, &'a Transition)> {
        self.entries
            .get(state)
            .into_iter()
            .flat_map(|reads| reads.iter())
            .map(|(read, transition)| (read.as_str(), transition))
    }
}

impl TryFrom<Vec<Instruction>> for TransitionTable {
    type Error = DefinitionError;

    fn try_from(instructions: Vec<Instruction>) -> Result<Self, Self::Error> {
        let mut table = TransitionTable::new();
        for instruction in instructions {
            table.insert(
                instruction.state,
                instruction.read,
                Transition {
                    next_state: instruction.next_state,
                    write: instruction.write,
                    direction: instruction.direction,
                },
            )?;
        }

        Ok(table)
    }
}

impl From<TransitionTable> for Vec<Instruction> {
    fn from(table: TransitionTable) -> Self {
        table
            .entries
            .into_iter()
            .flat_map(|(state, reads)| {
                reads.into_iter().map(move |(read, transition)| Instruction {
                    state: state.clone(),
                    read,
                    write: transition.write,
                    direction: transition.direction,
                    next_state: transition.next_state,
                })
            })
            .collect()
    }
}

impl Definition {
    /// Checks every construction invariant, returning the first violation found.
    ///
    /// The checks run in this order: empty alphabet, blank symbol, initial tape symbols,
    /// initial state, final states, and finally the states and symbols mentioned by the
    /// transition table.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.alphabet.is_empty() {
            return Err(DefinitionError::EmptyAlphabet);
        }

        if !self.alphabet.contains(&self.blank_symbol) {
            return Err(DefinitionError::BlankNotInAlphabet(
                self.blank_symbol.clone(),
            ));
        }

        if let Some((position, symbol)) = self
            .initial_tape
            .iter()
            .enumerate()
            .find(|(_, symbol)| !self.alphabet.contains(*symbol))
        {
            return Err(DefinitionError::UnknownTapeSymbol {
                position,
                symbol: symbol.clone(),
            });
        }

        if !self.states.contains(&self.initial_state) {
            return Err(DefinitionError::UnknownInitialState(
                self.initial_state.clone(),
            ));
        }

        let unknown: Vec<State> = self
            .final_states
            .difference(&self.states)
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(DefinitionError::UnknownFinalStates(unknown));
        }

        self.check_transitions()
    }

    fn check_transitions(&self) -> Result<(), DefinitionError> {
        for (state, read, transition) in self.transition_func.iter() {
            let unknown_state = [state, transition.next_state.as_str()]
                .into_iter()
                .find(|s| !self.states.contains(*s));
            if let Some(unknown) = unknown_state {
                return Err(DefinitionError::UnknownTransitionState {
                    state: state.to_string(),
                    read: read.to_string(),
                    unknown: unknown.to_string(),
                });
            }

            let unknown_symbol = [read, transition.write.as_str()]
                .into_iter()
                .find(|s| !self.alphabet.contains(*s));
            if let Some(unknown) = unknown_symbol {
                return Err(DefinitionError::UnknownTransitionSymbol {
                    state: state.to_string(),
                    read: read.to_string(),
                    unknown: unknown.to_string(),
                });
            }
        }

        Ok(())
    }
}

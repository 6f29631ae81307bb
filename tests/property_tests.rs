//! Property-based tests for the tape and the execution engine.
//!
//! These tests use proptest to verify that construction, stepping and halting behave the
//! same across many randomly generated tapes, head positions and transition tables.

use dtm::{
    Definition, DefinitionError, Direction, Halt, Step, Tape, Trace, Transition,
    TransitionTable, TuringMachine, TuringMachineError,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

const STATES: [&str; 4] = ["q0", "q1", "q2", "halt"];
const SYMBOLS: [&str; 3] = ["_", "a", "b"];

fn labels(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

prop_compose! {
    fn arbitrary_symbol()(index in 0..SYMBOLS.len()) -> String {
        SYMBOLS[index].to_string()
    }
}

prop_compose! {
    fn arbitrary_direction()(left in any::<bool>()) -> Direction {
        if left { Direction::Left } else { Direction::Right }
    }
}

prop_compose! {
    /// A partial transition table over `STATES` x `SYMBOLS`; `None` entries stay undefined.
    fn arbitrary_table()(
        entries in prop::collection::vec(
            prop::option::of((0..STATES.len(), arbitrary_symbol(), arbitrary_direction())),
            STATES.len() * SYMBOLS.len(),
        )
    ) -> TransitionTable {
        let mut table = TransitionTable::new();
        for (i, entry) in entries.into_iter().enumerate() {
            if let Some((next, write, direction)) = entry {
                let state = STATES[i / SYMBOLS.len()];
                let read = SYMBOLS[i % SYMBOLS.len()];
                table
                    .insert(state, read, Transition {
                        next_state: STATES[next].to_string(),
                        write,
                        direction,
                    })
                    .unwrap();
            }
        }
        table
    }
}

prop_compose! {
    fn arbitrary_definition()(
        transition_func in arbitrary_table(),
        initial_tape in prop::collection::vec(arbitrary_symbol(), 0..8),
        head in -10i64..10,
    ) -> Definition {
        Definition {
            name: "generated".to_string(),
            states: labels(&STATES),
            alphabet: labels(&SYMBOLS),
            blank_symbol: "_".to_string(),
            initial_tape,
            initial_state: "q0".to_string(),
            final_states: labels(&["halt"]),
            transition_func,
            head,
        }
    }
}

proptest! {
    #[test]
    fn unwritten_positions_read_blank(position in any::<i64>()) {
        let tape = Tape::new("_");
        prop_assert_eq!(tape.get(position), "_");
    }

    #[test]
    fn written_positions_read_back(
        writes in prop::collection::vec((-1000i64..1000, arbitrary_symbol()), 1..20)
    ) {
        let mut tape = Tape::new("_");
        for (position, symbol) in &writes {
            tape.set(*position, symbol.as_str());
        }

        // Later writes to the same position win.
        for (position, _) in &writes {
            let last = writes.iter().rev().find(|(p, _)| p == position).unwrap();
            prop_assert_eq!(tape.get(*position), last.1.as_str());
        }
    }

    #[test]
    fn construction_preserves_initial_configuration(definition in arbitrary_definition()) {
        let machine = TuringMachine::new(definition.clone()).unwrap();

        prop_assert_eq!(machine.state(), definition.initial_state.as_str());
        prop_assert_eq!(machine.head(), definition.head);
        for (i, symbol) in definition.initial_tape.iter().enumerate() {
            prop_assert_eq!(machine.tape().get(i as i64), symbol.as_str());
        }
        prop_assert_eq!(machine.tape().get(definition.initial_tape.len() as i64), "_");
        prop_assert_eq!(machine.tape().get(-1), "_");
    }

    #[test]
    fn blank_outside_alphabet_is_rejected(definition in arbitrary_definition()) {
        let mut definition = definition;
        definition.blank_symbol = "#".to_string();

        prop_assert_eq!(
            TuringMachine::new(definition).unwrap_err(),
            TuringMachineError::InvalidDefinition(DefinitionError::BlankNotInAlphabet("#".into()))
        );
    }

    #[test]
    fn unknown_tape_symbol_is_rejected(
        definition in arbitrary_definition(),
        position in 0usize..8,
    ) {
        let mut definition = definition;
        let position = position.min(definition.initial_tape.len());
        definition.initial_tape.insert(position, "#".to_string());

        let rejected = matches!(
            TuringMachine::new(definition),
            Err(TuringMachineError::InvalidDefinition(DefinitionError::UnknownTapeSymbol { .. }))
        );
        prop_assert!(rejected);
    }

    #[test]
    fn unknown_states_are_rejected(definition in arbitrary_definition(), initial in any::<bool>()) {
        let mut definition = definition;
        if initial {
            definition.initial_state = "nowhere".to_string();
        } else {
            definition.final_states.insert("nowhere".to_string());
        }

        prop_assert!(TuringMachine::new(definition).is_err());
    }

    #[test]
    fn execution_is_deterministic(definition in arbitrary_definition(), steps in 0usize..50) {
        let mut first = TuringMachine::new(definition.clone()).unwrap();
        let mut second = TuringMachine::new(definition).unwrap();

        let a = first.run(steps, false);
        let b = second.run(steps, false);

        prop_assert_eq!(a, b);
        prop_assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn halting_is_idempotent(definition in arbitrary_definition()) {
        let mut machine = TuringMachine::new(definition).unwrap();

        if let Step::Halt(halt) = machine.run(200, false) {
            let halted = machine.snapshot();
            prop_assert_eq!(machine.step(), Step::Halt(halt));
            prop_assert_eq!(machine.run(10, false), Step::Halt(halt));
            prop_assert_eq!(machine.snapshot(), halted);
        }
    }

    #[test]
    fn halt_reason_matches_configuration(definition in arbitrary_definition()) {
        let mut machine = TuringMachine::new(definition).unwrap();

        match machine.run(200, false) {
            Step::Halt(Halt::Final) => prop_assert_eq!(machine.state(), "halt"),
            Step::Halt(Halt::Undefined) => {
                prop_assert_ne!(machine.state(), "halt");
                prop_assert!(machine.transition().is_none());
            }
            Step::Halt(Halt::TapeLimit) => prop_assert!(machine.head().abs_diff(0) > 1 << 62),
            Step::Continue => prop_assert_eq!(machine.step_count(), 200),
        }
    }

    #[test]
    fn extreme_heads_never_panic(
        definition in arbitrary_definition(),
        right in any::<bool>(),
        steps in 0usize..20,
    ) {
        let mut definition = definition;
        definition.head = if right { i64::MAX } else { i64::MIN };
        let mut machine = TuringMachine::new(definition).unwrap();

        let mut trace = Trace::new(Vec::new(), 40);
        machine.run_with(steps, &mut trace);
        prop_assert!(trace.finish().is_ok());
    }

    #[test]
    fn zero_iterations_change_nothing(definition in arbitrary_definition()) {
        let mut machine = TuringMachine::new(definition).unwrap();
        let before = machine.snapshot();

        machine.run(0, false);

        prop_assert_eq!(machine.snapshot(), before);
    }

    #[test]
    fn written_symbols_stay_in_alphabet(definition in arbitrary_definition()) {
        let alphabet = definition.alphabet.clone();
        let mut machine = TuringMachine::new(definition).unwrap();
        machine.run(100, false);

        for (_, symbol) in machine.tape().iter() {
            prop_assert!(alphabet.contains(symbol));
        }
    }
}

//! Machine definitions embedded in the binary, and lookup helpers over them.

use crate::definition::Definition;
use crate::types::TuringMachineError;

// Default embedded machines
const MACHINE_TEXTS: [&str; 3] = [
    include_str!("../machines/destroy-all-software.tm"),
    include_str!("../machines/binary-increment.tm"),
    include_str!("../machines/busy-beaver-2.tm"),
];

lazy_static::lazy_static! {
    /// The embedded machines that parsed successfully, in declaration order.
    pub static ref MACHINES: Vec<(&'static str, Definition)> = MACHINE_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(definition) => Some((*text, definition)),
            Err(e) => {
                log::error!("Failed to parse embedded machine: {}", e);
                None
            }
        })
        .collect();
}

/// Summary of an embedded machine.
#[derive(Debug, Clone)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: Vec<String>,
    pub state_count: usize,
    pub symbol_count: usize,
    pub transition_count: usize,
}

pub struct MachineManager;

impl MachineManager {
    /// Get the number of available machines
    pub fn count() -> usize {
        MACHINES.len()
    }

    /// Get a machine by its index
    pub fn get_by_index(index: usize) -> Result<Definition, TuringMachineError> {
        MACHINES
            .get(index)
            .map(|(_, definition)| definition.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Machine index {} out of range", index))
            })
    }

    /// Get a machine by its name, ignoring case
    pub fn get_by_name(name: &str) -> Result<Definition, TuringMachineError> {
        MACHINES
            .iter()
            .find(|(_, definition)| definition.name.eq_ignore_ascii_case(name))
            .map(|(_, definition)| definition.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Machine '{}' not found", name))
            })
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        MACHINES
            .iter()
            .map(|(_, definition)| definition.name.clone())
            .collect()
    }

    /// Get information about a machine by its index
    pub fn info(index: usize) -> Result<MachineInfo, TuringMachineError> {
        let definition = Self::get_by_index(index)?;

        Ok(MachineInfo {
            index,
            state_count: definition.states.len(),
            symbol_count: definition.alphabet.len(),
            transition_count: definition.transition_func.len(),
            name: definition.name,
            initial_state: definition.initial_state,
            initial_tape: definition.initial_tape,
        })
    }

    /// Search for machines by name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        MACHINES
            .iter()
            .enumerate()
            .filter(|(_, (_, definition))| definition.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the source text of a machine by its index
    pub fn text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        MACHINES.get(index).map(|(text, _)| *text).ok_or_else(|| {
            TuringMachineError::ValidationError(format!(
                "Machine text index {} out of range",
                index
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;
    use crate::types::{Halt, Step};

    #[test]
    fn test_all_machines_parse() {
        assert_eq!(MachineManager::count(), MACHINE_TEXTS.len());
    }

    #[test]
    fn test_machine_names() {
        let names = MachineManager::names();
        assert_eq!(
            names,
            vec!["Destroy All Software", "Binary Increment", "Busy Beaver 2"]
        );
    }

    #[test]
    fn test_get_by_index() {
        assert!(MachineManager::get_by_index(0).is_ok());
        assert!(MachineManager::get_by_index(999).is_err());
    }

    #[test]
    fn test_get_by_name() {
        let definition = MachineManager::get_by_name("busy beaver 2").unwrap();
        assert_eq!(definition.initial_state, "A");

        assert!(MachineManager::get_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_info() {
        let info = MachineManager::info(1).unwrap();

        assert_eq!(info.index, 1);
        assert_eq!(info.name, "Binary Increment");
        assert_eq!(info.initial_tape, vec!["1", "0", "1", "1"]);
        assert_eq!(info.state_count, 3);
        assert_eq!(info.symbol_count, 3);
        assert_eq!(info.transition_count, 6);

        assert!(MachineManager::info(999).is_err());
    }

    #[test]
    fn test_search() {
        assert_eq!(MachineManager::search("BINARY"), vec![1]);
        assert_eq!(MachineManager::search("e"), vec![0, 1, 2]);
        assert!(MachineManager::search("nonexistent").is_empty());
        assert_eq!(MachineManager::search(""), vec![0, 1, 2]);
    }

    #[test]
    fn test_text_by_index() {
        let text = MachineManager::text_by_index(0).unwrap();
        assert!(text.contains("name: Destroy All Software"));
        assert!(MachineManager::text_by_index(999).is_err());
    }

    #[test]
    fn test_destroy_all_software_cycles() {
        let definition = MachineManager::get_by_name("Destroy All Software").unwrap();
        let mut machine = TuringMachine::new(definition).unwrap();

        assert_eq!(machine.run(4, false), Step::Continue);
        assert_eq!(machine.state(), "s1");
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.tape().window(0, 2), vec!["B", "B"]);
    }

    #[test]
    fn test_binary_increment() {
        let definition = MachineManager::get_by_name("Binary Increment").unwrap();
        let mut machine = TuringMachine::new(definition).unwrap();

        assert_eq!(machine.run(100, false), Step::Halt(Halt::Final));
        assert_eq!(machine.step_count(), 8);
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.tape().window(0, 4), vec!["1", "1", "0", "0"]);
    }

    #[test]
    fn test_busy_beaver() {
        let definition = MachineManager::get_by_name("Busy Beaver 2").unwrap();
        let mut machine = TuringMachine::new(definition).unwrap();

        assert_eq!(machine.run(100, false), Step::Halt(Halt::Final));
        assert_eq!(machine.step_count(), 6);
        assert_eq!(machine.tape().iter().filter(|(_, s)| *s == "1").count(), 4);
        assert_eq!(machine.tape().bounds(), Some((-2, 1)));
    }
}

//! This module provides the `MachineLoader` struct, responsible for loading machine
//! definitions from files and strings in either the `.tm` text format or JSON.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of the text format.
pub const TEXT_EXTENSION: &str = "tm";
/// File extension of the JSON format.
pub const JSON_EXTENSION: &str = "json";

/// `MachineLoader` is a utility struct for loading machine definitions.
/// It loads single files, string content, and every definition file in a directory.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// Files ending in `.json` are read as JSON; everything else is parsed as `.tm` text.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read, parsed and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * `Err(_)` with the parse or validation error otherwise.
    pub fn load(path: &Path) -> Result<Definition, TuringMachineError> {
        log::debug!("loading machine definition from {}", path.display());

        let metadata = fs::metadata(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        if metadata.len() > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} is {} bytes, the limit is {}",
                path.display(),
                metadata.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if has_extension(path, JSON_EXTENSION) {
            Self::load_json_from_string(&content)
        } else {
            Self::load_from_string(&content)
        }
    }

    /// Parses a `.tm` definition from string content.
    pub fn load_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        parse(content)
    }

    /// Parses a JSON definition from string content and validates it.
    pub fn load_json_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        let definition: Definition = serde_json::from_str(content)?;
        definition.validate()?;

        Ok(definition)
    }

    /// Loads every `.tm` and `.json` file in `directory`.
    ///
    /// Subdirectories and other files are skipped. Each element of the result is either the
    /// path and its definition, or the error that prevented loading it.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Definition), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir()
                    || !(has_extension(&path, TEXT_EXTENSION)
                        || has_extension(&path, JSON_EXTENSION))
                {
                    return None;
                }

                match Self::load(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(e) => Some(Err(TuringMachineError::FileError(format!(
                        "Failed to load machine from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect();

        // read_dir order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

//! A sparse, logically bi-infinite tape addressed by signed positions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Symbol;

/// The tape of a single-tape Turing Machine.
///
/// Only cells that have been written are stored; every other position reads as the
/// blank symbol. Positions may be negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, Symbol>,
    blank: Symbol,
}

/// A contiguous run of cells, starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeView {
    pub start: i64,
    pub symbols: Vec<Symbol>,
}

impl Tape {
    /// Creates an empty tape filled with `blank`.
    pub fn new(blank: impl Into<Symbol>) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank: blank.into(),
        }
    }

    /// Creates a tape with `contents` written from position 0 onwards.
    pub fn with_contents<I, S>(blank: impl Into<Symbol>, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut tape = Self::new(blank);
        for (position, symbol) in (0..).zip(contents) {
            tape.set(position, symbol);
        }

        tape
    }

    /// Returns the symbol at `position`, or the blank symbol if it was never written.
    pub fn get(&self, position: i64) -> &str {
        self.cells.get(&position).unwrap_or(&self.blank)
    }

    /// Writes `symbol` at `position`.
    pub fn set(&mut self, position: i64, symbol: impl Into<Symbol>) {
        self.cells.insert(position, symbol.into());
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> &str {
        &self.blank
    }

    /// Number of cells that have been written.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the leftmost and rightmost written positions, if any cell was written.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;
        Some((*first, *last))
    }

    /// Returns `len` symbols starting at `start`, blanks included.
    ///
    /// The window stops early at `i64::MAX`.
    pub fn window(&self, start: i64, len: usize) -> Vec<&str> {
        (0..len)
            .map_while(|offset| start.checked_add(i64::try_from(offset).ok()?))
            .map(|position| self.get(position))
            .collect()
    }

    /// Returns the written span of the tape, from the leftmost to the rightmost written cell.
    pub fn contents(&self) -> TapeView {
        match self.bounds() {
            Some((first, last)) => TapeView {
                start: first,
                symbols: (first..=last)
                    .map(|position| self.get(position).to_string())
                    .collect(),
            },
            None => TapeView {
                start: 0,
                symbols: Vec::new(),
            },
        }
    }

    /// Iterates over written cells in position order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.cells
            .iter()
            .map(|(position, symbol)| (*position, symbol.as_str()))
    }
}

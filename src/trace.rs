//! Step-by-step rendering of a running machine.
//!
//! The machine reports its progress through the [`Observer`] hooks; [`Trace`] is the observer
//! that prints each configuration as two lines: the step index, state, and a window of tape
//! cells, followed by a `^` marker under the head.

use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::machine::TuringMachine;
use crate::types::Halt;

/// Receives notifications while a machine runs.
pub trait Observer {
    /// Called once before the first step.
    fn on_start(&mut self, _machine: &TuringMachine) {}

    /// Called after every applied transition.
    fn on_step(&mut self, _machine: &TuringMachine) {}

    /// Called when the machine halts.
    fn on_halt(&mut self, _machine: &TuringMachine, _halt: Halt) {}
}

/// The silent observer.
impl Observer for () {}

/// Two rendered lines for a single machine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tape: String,
    pub marker: String,
}

impl Frame {
    /// Renders `machine` into at most `width` columns.
    ///
    /// Every cell is padded to the widest symbol of the alphabet. The window begins at the
    /// leftmost written cell or the head, whichever is further left, and slides right only as
    /// far as needed to keep the head visible.
    pub fn capture(machine: &TuringMachine, width: usize) -> Self {
        let definition = machine.definition();
        let cell_width = definition
            .alphabet
            .iter()
            .map(|symbol| symbol.width())
            .max()
            .unwrap_or(1)
            .max(1);
        let state_width = definition
            .states
            .iter()
            .map(|state| state.width())
            .max()
            .unwrap_or(0);

        let prefix = format!(
            "{:>5} {:>state_width$}: ",
            machine.step_count(),
            machine.state(),
        );
        let prefix_width = prefix.width();
        let cells = (width.saturating_sub(prefix_width) / cell_width).max(1);

        let head = machine.head();
        let leftmost = machine
            .tape()
            .bounds()
            .map_or(head, |(first, _)| first.min(head));
        let span = i64::try_from(cells - 1).unwrap_or(i64::MAX);
        let start = leftmost.max(head.saturating_sub(span));

        // The last cell is left unpadded so that whitespace symbols survive.
        let symbols = machine.tape().window(start, cells);
        let mut tape = prefix;
        for (i, symbol) in symbols.iter().enumerate() {
            tape.push_str(symbol);
            if i + 1 < symbols.len() {
                tape.push_str(&" ".repeat(cell_width - symbol.width().min(cell_width)));
            }
        }

        let column = head.abs_diff(start) as usize;
        let offset = prefix_width + column * cell_width;
        let marker = format!("{}^", " ".repeat(offset));

        Self { tape, marker }
    }
}

/// An observer that writes a [`Frame`] for the initial configuration and after every step.
///
/// Write failures do not interrupt the machine; the first one is kept and returned by
/// [`Trace::finish`], and nothing more is written after it.
pub struct Trace<W: Write> {
    writer: W,
    width: usize,
    error: Option<io::Error>,
}

impl<W: Write> Trace<W> {
    pub fn new(writer: W, width: usize) -> Self {
        Self {
            writer,
            width,
            error: None,
        }
    }

    /// Flushes the writer and hands it back, or returns the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;

        Ok(self.writer)
    }

    fn write_frame(&mut self, machine: &TuringMachine) {
        if self.error.is_some() {
            return;
        }

        let frame = Frame::capture(machine, self.width);
        if let Err(e) = writeln!(self.writer, "{}\n{}", frame.tape, frame.marker) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> Observer for Trace<W> {
    fn on_start(&mut self, machine: &TuringMachine) {
        self.write_frame(machine);
    }

    fn on_step(&mut self, machine: &TuringMachine) {
        self.write_frame(machine);
    }

    fn on_halt(&mut self, machine: &TuringMachine, halt: Halt) {
        if self.error.is_some() {
            return;
        }

        if let Err(e) = writeln!(self.writer, "halted in state {}: {}", machine.state(), halt) {
            self.error = Some(e);
        }
    }
}
